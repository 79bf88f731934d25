use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::ManagerError;
use vigil_core::alert::port::AlertStore;
use vigil_core::data::entity::{Client, Order, TableKind, Trade};
use vigil_core::data::port::TradeDataStore;
use vigil_core::detect::entity::{AlertDraft, DetectionInput, RunStatus};
use vigil_core::detect::port::Detector;
use vigil_core::rules::port::RuleStore;

/// 上传一批记录的结果。`new_alerts` 仅在 trades 上传联动检测成功时存在。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadOutcome {
    pub records_uploaded: u32,
    pub new_alerts: Option<u32>,
}

/// 四张表的当前记录数。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableCounts {
    pub orders: u32,
    pub trades: u32,
    pub clients: u32,
    pub alerts: u32,
}

/// # Summary
/// 检测管理器，检测运行与数据上传的应用服务层门面 (Facade)。
/// 编译期仅依赖 `vigil-core` 中的 Trait 定义，所有具体实现通过构造函数注入。
///
/// # Invariants
/// - 任意时刻最多一轮检测在执行：`running` 标志以 CAS 方式抢占，
///   抢占失败的触发立即返回 `RunInProgress`，绝不并行执行。
/// - 一轮运行对规则配置与成交数据各取一次快照，运行期间的写入不影响本轮。
/// - 检测或落库失败时本轮不提交任何告警，状态记为 `Failed`。
pub struct DetectionManager {
    // 规则配置接口
    rule_store: Arc<dyn RuleStore>,
    // 交易数据接口
    data_store: Arc<dyn TradeDataStore>,
    // 告警持久化接口
    alert_store: Arc<dyn AlertStore>,
    // 注册的检测器，每个规则族一个
    detectors: Vec<Box<dyn Detector>>,
    // 运行互斥标志
    running: AtomicBool,
    // 最近一轮运行的可轮询状态
    status: RwLock<RunStatus>,
}

// 运行互斥标志的释放守卫。持有期间覆盖整轮运行，
// Drop 时无条件释放标志；请求 Future 在 await 点被丢弃时
// 状态若仍停留在 Running，则回写为 Failed，避免永久卡死后续触发。
struct RunGuard<'a> {
    running: &'a AtomicBool,
    status: &'a RwLock<RunStatus>,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut status) = self.status.try_write() {
            if matches!(*status, RunStatus::Running { .. }) {
                *status = RunStatus::Failed {
                    error: "detection run cancelled".to_string(),
                };
            }
        }
        self.running.store(false, Ordering::Release);
    }
}

impl DetectionManager {
    /// # Summary
    /// 创建 DetectionManager 实例。
    ///
    /// # Arguments
    /// * `rule_store` - 规则配置接口的具体实现。
    /// * `data_store` - 交易数据接口的具体实现。
    /// * `alert_store` - 告警持久化接口的具体实现。
    /// * `detectors` - 检测器列表，通常来自 `vigil-engine` 的工厂。
    ///
    /// # Returns
    /// * `Arc<Self>` - 可共享的管理器实例。
    pub fn new(
        rule_store: Arc<dyn RuleStore>,
        data_store: Arc<dyn TradeDataStore>,
        alert_store: Arc<dyn AlertStore>,
        detectors: Vec<Box<dyn Detector>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            rule_store,
            data_store,
            alert_store,
            detectors,
            running: AtomicBool::new(false),
            status: RwLock::new(RunStatus::Idle),
        })
    }

    /// # Summary
    /// 执行一轮检测。
    ///
    /// # Logic
    /// 1. CAS 抢占运行标志，失败则返回 `RunInProgress`。
    /// 2. 读取规则配置快照与全量成交快照。
    /// 3. 依次对启用的规则族求值，禁用的跳过。
    /// 4. 全部草稿在单个事务内落库，指纹重复的静默去重。
    /// 5. 记录 `Completed` / `Failed` 状态并释放标志。
    ///
    /// # Returns
    /// * `Result<u32, ManagerError>` - 本轮真正新插入的告警数量。
    pub async fn run_detection(&self) -> Result<u32, ManagerError> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ManagerError::RunInProgress);
        }
        let _guard = RunGuard {
            running: &self.running,
            status: &self.status,
        };

        *self.status.write().await = RunStatus::Running {
            started_at: Utc::now(),
        };

        let result = self.execute_run().await;

        match &result {
            Ok(inserted) => {
                info!("Detection run completed: {} new alerts", inserted);
                *self.status.write().await = RunStatus::Completed {
                    alerts_generated: *inserted,
                    finished_at: Utc::now(),
                };
            }
            Err(e) => {
                error!("Detection run failed: {}", e);
                *self.status.write().await = RunStatus::Failed {
                    error: e.to_string(),
                };
            }
        }

        result
    }

    /// 最近一轮运行的状态快照，供轮询端点使用。
    pub async fn run_status(&self) -> RunStatus {
        self.status.read().await.clone()
    }

    // 一轮检测的实际执行体，失败时不留下任何部分写入
    async fn execute_run(&self) -> Result<u32, ManagerError> {
        let snapshot = self.rule_store.snapshot();
        let trades = self.data_store.load_trades().await?;
        let input = DetectionInput {
            trades,
            now: Utc::now(),
        };

        let mut drafts: Vec<AlertDraft> = Vec::new();
        for detector in &self.detectors {
            let rule = detector.rule_name();
            let Some(config) = snapshot.get(rule) else {
                continue;
            };
            if !config.enabled {
                info!("Rule {} disabled, skipping", rule);
                continue;
            }

            let produced = detector
                .evaluate(&input, config)
                .map_err(|e| ManagerError::Upstream(e.to_string()))?;
            info!("Rule {} produced {} draft(s)", rule, produced.len());
            drafts.extend(produced);
        }

        Ok(self.alert_store.insert_batch(&drafts).await?)
    }

    /// # Summary
    /// 上传成交记录（整表替换）并联动一轮检测。
    ///
    /// # Logic
    /// 1. 替换 trades 表内容。
    /// 2. 尝试执行检测；检测失败只记录日志，不影响上传结果。
    pub async fn upload_trades(&self, rows: &[Trade]) -> Result<UploadOutcome, ManagerError> {
        let records_uploaded = self.data_store.replace_trades(rows).await?;

        let new_alerts = match self.run_detection().await {
            Ok(n) => Some(n),
            Err(e) => {
                warn!("Detection after trades upload failed: {}", e);
                None
            }
        };

        Ok(UploadOutcome {
            records_uploaded,
            new_alerts,
        })
    }

    /// 上传委托记录（整表替换），不联动检测。
    pub async fn upload_orders(&self, rows: &[Order]) -> Result<UploadOutcome, ManagerError> {
        let records_uploaded = self.data_store.replace_orders(rows).await?;
        Ok(UploadOutcome {
            records_uploaded,
            new_alerts: None,
        })
    }

    /// 上传客户记录（整表替换），不联动检测。
    pub async fn upload_clients(&self, rows: &[Client]) -> Result<UploadOutcome, ManagerError> {
        let records_uploaded = self.data_store.replace_clients(rows).await?;
        Ok(UploadOutcome {
            records_uploaded,
            new_alerts: None,
        })
    }

    /// 四张表的当前记录数。
    pub async fn table_counts(&self) -> Result<TableCounts, ManagerError> {
        Ok(TableCounts {
            orders: self.data_store.count(TableKind::Orders).await?,
            trades: self.data_store.count(TableKind::Trades).await?,
            clients: self.data_store.count(TableKind::Clients).await?,
            alerts: self.alert_store.stats().await?.total_alerts,
        })
    }

    /// 清空指定数据表（状态机之外的批量删除）。
    pub async fn clear_table(&self, kind: TableKind) -> Result<(), ManagerError> {
        info!("Clearing table {:?}", kind);
        Ok(self.data_store.clear(kind).await?)
    }

    /// 清空全部数据表与告警库。
    pub async fn clear_all(&self) -> Result<(), ManagerError> {
        info!("Clearing all data tables and alerts");
        self.data_store.clear_all().await?;
        self.alert_store.clear().await?;
        Ok(())
    }
}
