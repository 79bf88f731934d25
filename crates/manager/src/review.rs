use chrono::{Duration, Utc};
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

use crate::ManagerError;
use vigil_core::alert::entity::{Alert, AlertFilter, AlertStats, AlertStatus};
use vigil_core::alert::policy::TransitionPolicy;
use vigil_core::alert::port::AlertStore;
use vigil_core::data::entity::{SymbolActivity, TableKind};
use vigil_core::data::port::TradeDataStore;
use vigil_core::score::{self, ComplianceScore, ScoreInput};

// 最近活动视图的窗口与条数，与控制台展示一致
const RECENT_ALERTS_LIMIT: u32 = 10;
const ACTIVE_SYMBOLS_LIMIT: u32 = 5;
const ACTIVITY_WINDOW_HOURS: i64 = 24;

/// 看板头部统计。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_alerts: u32,
    pub high_risk_alerts: u32,
    pub medium_risk_alerts: u32,
    pub low_risk_alerts: u32,
    pub alerts_today: u32,
    pub total_trades: u32,
    pub total_clients: u32,
}

/// 合规评分报告：分数、分段与参与计算的计数。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComplianceReport {
    pub score: ComplianceScore,
    pub total_trades: u32,
    pub open_alerts: u32,
    pub high_risk_alerts: u32,
}

/// 最近活动：最新告警与 24 小时内的活跃标的。
#[derive(Debug, Clone)]
pub struct RecentActivity {
    pub recent_alerts: Vec<Alert>,
    pub active_symbols: Vec<SymbolActivity>,
}

/// # Summary
/// 告警复核与看板查询的应用服务。
/// 状态迁移经过注入的 [`TransitionPolicy`] 裁决后才落库。
pub struct ReviewService {
    alert_store: Arc<dyn AlertStore>,
    data_store: Arc<dyn TradeDataStore>,
    policy: Arc<dyn TransitionPolicy>,
}

impl ReviewService {
    pub fn new(
        alert_store: Arc<dyn AlertStore>,
        data_store: Arc<dyn TradeDataStore>,
        policy: Arc<dyn TransitionPolicy>,
    ) -> Arc<Self> {
        Arc::new(Self {
            alert_store,
            data_store,
            policy,
        })
    }

    /// 按过滤器查询告警列表。
    pub async fn list_alerts(&self, filter: &AlertFilter) -> Result<Vec<Alert>, ManagerError> {
        Ok(self.alert_store.list(filter).await?)
    }

    /// 根据 ID 获取单条告警。
    pub async fn get_alert(&self, alert_id: &str) -> Result<Alert, ManagerError> {
        Ok(self.alert_store.get(alert_id).await?)
    }

    /// # Summary
    /// 更新告警状态。
    ///
    /// # Logic
    /// 1. 解析请求携带的状态值，无法识别则拒绝。
    /// 2. 读取当前告警，不存在返回 NotFound。
    /// 3. 交由装配的迁移策略裁决，拒绝则整体失败。
    /// 4. 原子写入新状态并返回更新后的完整记录。
    pub async fn update_status(
        &self,
        alert_id: &str,
        status: &str,
    ) -> Result<Alert, ManagerError> {
        let target = AlertStatus::from_str(status).map_err(ManagerError::InvalidValue)?;

        let current = self.alert_store.get(alert_id).await?;
        if !self.policy.allows(current.status, target) {
            return Err(ManagerError::TransitionDenied {
                from: current.status.to_string(),
                to: target.to_string(),
            });
        }

        let updated = self.alert_store.set_status(alert_id, target).await?;
        info!(
            "Alert {} transitioned {} -> {}",
            alert_id, current.status, updated.status
        );
        Ok(updated)
    }

    /// 告警库的全量聚合统计。
    pub async fn alert_stats(&self) -> Result<AlertStats, ManagerError> {
        Ok(self.alert_store.stats().await?)
    }

    /// 看板头部统计：按严重度的告警计数加上数据表规模。
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ManagerError> {
        let stats = self.alert_store.stats().await?;
        let total_trades = self.data_store.count(TableKind::Trades).await?;
        let total_clients = self.data_store.count(TableKind::Clients).await?;

        Ok(DashboardStats {
            total_alerts: stats.total_alerts,
            high_risk_alerts: stats.high_alerts,
            medium_risk_alerts: stats.medium_alerts,
            low_risk_alerts: stats.low_alerts,
            alerts_today: stats.alerts_today,
            total_trades,
            total_clients,
        })
    }

    /// # Summary
    /// 计算当前合规评分。每次请求基于最新计数重新计算，无缓存。
    pub async fn compliance_score(&self) -> Result<ComplianceReport, ManagerError> {
        let stats = self.alert_store.stats().await?;
        let total_trades = self.data_store.count(TableKind::Trades).await?;

        let score = score::compute(ScoreInput {
            total_trades,
            open_alerts: stats.open_alerts,
            open_high_alerts: stats.open_high_alerts,
        });

        Ok(ComplianceReport {
            score,
            total_trades,
            open_alerts: stats.open_alerts,
            high_risk_alerts: stats.open_high_alerts,
        })
    }

    /// 最近活动：最新 10 条告警与 24 小时内最活跃的 5 个标的。
    pub async fn recent_activity(&self) -> Result<RecentActivity, ManagerError> {
        let recent_alerts = self.alert_store.recent(RECENT_ALERTS_LIMIT).await?;
        let since = Utc::now() - Duration::hours(ACTIVITY_WINDOW_HOURS);
        let active_symbols = self
            .data_store
            .active_symbols(since, ACTIVE_SYMBOLS_LIMIT)
            .await?;

        Ok(RecentActivity {
            recent_alerts,
            active_symbols,
        })
    }
}
