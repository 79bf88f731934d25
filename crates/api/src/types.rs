//! # DTO (Data Transfer Object) 层
//!
//! 将内部领域模型转化为面向前端 JSON 输出的轻量结构体。
//! 所有 DTO 必须派生 `utoipa::ToSchema` 以自动进入 Swagger 文档。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use vigil_core::alert::entity::{Alert, AlertStats};
use vigil_core::data::entity::SymbolActivity;
use vigil_core::detect::entity::RunStatus;
use vigil_core::rules::entity::{RuleConfig, RuleName};
use vigil_manager::detection::TableCounts;
use vigil_manager::review::{ComplianceReport, DashboardStats};

// ============================================================
//  告警相关 DTO
// ============================================================

/// 告警 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AlertResponse {
    /// 告警 ID
    #[schema(example = "a1b2c3d4-e5f6-7890")]
    pub alert_id: String,
    /// 触发的规则族
    #[schema(example = "self_trade")]
    pub rule_name: String,
    /// 严重度 (LOW / MEDIUM / HIGH)
    #[schema(example = "HIGH")]
    pub severity: String,
    /// 人类可读描述
    #[schema(example = "Client C-001 executed 8 offsetting trades in AAPL within 24 hours")]
    pub description: String,
    /// 涉及的客户
    #[schema(example = "C-001")]
    pub client_id: Option<String>,
    /// 涉及的标的
    #[schema(example = "AAPL")]
    pub symbol: Option<String>,
    /// 复核状态 (OPEN / IN_REVIEW / CLOSED / FALSE_POSITIVE)
    #[schema(example = "OPEN")]
    pub status: String,
    /// 检测证据明细
    #[schema(value_type = Option<Object>)]
    pub data_json: Option<serde_json::Value>,
    /// 创建时间 (ISO 8601)
    #[schema(example = "2026-03-01T00:00:00Z")]
    pub created_at: String,
}

impl From<&Alert> for AlertResponse {
    fn from(alert: &Alert) -> Self {
        Self {
            alert_id: alert.alert_id.clone(),
            rule_name: alert.rule_name.to_string(),
            severity: alert.severity.to_string(),
            description: alert.description.clone(),
            client_id: alert.client_id.clone(),
            symbol: alert.symbol.clone(),
            status: alert.status.to_string(),
            data_json: alert.data_json.clone(),
            created_at: alert.created_at.to_rfc3339(),
        }
    }
}

/// 告警聚合统计 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AlertStatsResponse {
    /// 告警总数
    #[schema(example = 42)]
    pub total_alerts: u32,
    /// HIGH 告警数
    #[schema(example = 7)]
    pub high_alerts: u32,
    /// MEDIUM 告警数
    #[schema(example = 20)]
    pub medium_alerts: u32,
    /// LOW 告警数
    #[schema(example = 15)]
    pub low_alerts: u32,
    /// 今日新增告警数
    #[schema(example = 3)]
    pub alerts_today: u32,
    /// 未决告警数
    #[schema(example = 12)]
    pub open_alerts: u32,
    /// 复核中告警数
    #[schema(example = 5)]
    pub in_review_alerts: u32,
    /// 已关闭告警数
    #[schema(example = 20)]
    pub closed_alerts: u32,
    /// 误报告警数
    #[schema(example = 5)]
    pub false_positive_alerts: u32,
}

impl From<&AlertStats> for AlertStatsResponse {
    fn from(stats: &AlertStats) -> Self {
        Self {
            total_alerts: stats.total_alerts,
            high_alerts: stats.high_alerts,
            medium_alerts: stats.medium_alerts,
            low_alerts: stats.low_alerts,
            alerts_today: stats.alerts_today,
            open_alerts: stats.open_alerts,
            in_review_alerts: stats.in_review_alerts,
            closed_alerts: stats.closed_alerts,
            false_positive_alerts: stats.false_positive_alerts,
        }
    }
}

// ============================================================
//  数据上传与检测 DTO
// ============================================================

/// CSV 上传结果 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    /// 结果描述
    #[schema(example = "Successfully uploaded 120 records to trades")]
    pub message: String,
    /// 写入的记录数
    #[schema(example = 120)]
    pub records_uploaded: u32,
    /// 目标表 (orders / trades / clients)
    #[schema(example = "trades")]
    pub table_type: String,
    /// 联动检测新产生的告警数 (仅 trades 上传)
    #[schema(example = 2)]
    pub new_alerts_generated: u32,
}

/// 手动检测运行结果 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DetectionRunResponse {
    /// 结果描述
    #[schema(example = "Detection completed successfully")]
    pub message: String,
    /// 本轮新产生的告警数
    #[schema(example = 3)]
    pub alerts_generated: u32,
}

/// 检测运行状态 DTO (轮询端点)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RunStatusResponse {
    /// 状态 (idle / running / completed / failed)
    #[schema(example = "completed")]
    pub state: String,
    /// 启动时间 (running)
    #[schema(example = "2026-03-01T00:00:00Z")]
    pub started_at: Option<String>,
    /// 新产生的告警数 (completed)
    #[schema(example = 3)]
    pub alerts_generated: Option<u32>,
    /// 结束时间 (completed)
    #[schema(example = "2026-03-01T00:00:05Z")]
    pub finished_at: Option<String>,
    /// 失败原因 (failed)
    pub error: Option<String>,
}

impl From<&RunStatus> for RunStatusResponse {
    fn from(status: &RunStatus) -> Self {
        match status {
            RunStatus::Idle => Self {
                state: "idle".to_string(),
                started_at: None,
                alerts_generated: None,
                finished_at: None,
                error: None,
            },
            RunStatus::Running { started_at } => Self {
                state: "running".to_string(),
                started_at: Some(started_at.to_rfc3339()),
                alerts_generated: None,
                finished_at: None,
                error: None,
            },
            RunStatus::Completed {
                alerts_generated,
                finished_at,
            } => Self {
                state: "completed".to_string(),
                started_at: None,
                alerts_generated: Some(*alerts_generated),
                finished_at: Some(finished_at.to_rfc3339()),
                error: None,
            },
            RunStatus::Failed { error } => Self {
                state: "failed".to_string(),
                started_at: None,
                alerts_generated: None,
                finished_at: None,
                error: Some(error.clone()),
            },
        }
    }
}

/// 单表记录数
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TableRecordCount {
    /// 当前记录数
    #[schema(example = 120)]
    pub record_count: u32,
}

/// 全部表的记录数 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TableInfoResponse {
    pub orders: TableRecordCount,
    pub trades: TableRecordCount,
    pub clients: TableRecordCount,
    pub alerts: TableRecordCount,
}

impl From<&TableCounts> for TableInfoResponse {
    fn from(counts: &TableCounts) -> Self {
        Self {
            orders: TableRecordCount {
                record_count: counts.orders,
            },
            trades: TableRecordCount {
                record_count: counts.trades,
            },
            clients: TableRecordCount {
                record_count: counts.clients,
            },
            alerts: TableRecordCount {
                record_count: counts.alerts,
            },
        }
    }
}

// ============================================================
//  规则配置 DTO
// ============================================================

/// 规则族配置 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RuleConfigResponse {
    /// 规则族名称
    #[schema(example = "self_trade")]
    pub rule_name: String,
    /// 是否参与检测运行
    #[schema(example = true)]
    pub enabled: bool,
    /// 当前参数集
    #[schema(value_type = Object, example = json!({"time_window_hours": 24, "min_trade_pairs": 4, "offsetting_threshold": 0.7}))]
    pub params: serde_json::Value,
}

impl RuleConfigResponse {
    pub fn from_config(rule: RuleName, config: &RuleConfig) -> Self {
        Self {
            rule_name: rule.to_string(),
            enabled: config.enabled,
            params: serde_json::to_value(&config.params).unwrap_or_default(),
        }
    }
}

/// 更新规则参数请求体 DTO。所有参数先整体校验再落库，
/// 任何一个越界或类型不符都会拒绝整个请求。
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateParamsRequest {
    /// 参数名到新值的映射
    #[schema(value_type = Object, example = json!({"min_trade_pairs": 6}))]
    pub params: BTreeMap<String, serde_json::Value>,
}

/// 切换规则开关请求体 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SetEnabledRequest {
    /// 目标开关状态
    #[schema(example = false)]
    pub enabled: bool,
}

// ============================================================
//  看板 DTO
// ============================================================

/// 看板头部统计 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardStatsResponse {
    #[schema(example = 42)]
    pub total_alerts: u32,
    #[schema(example = 7)]
    pub high_risk_alerts: u32,
    #[schema(example = 20)]
    pub medium_risk_alerts: u32,
    #[schema(example = 15)]
    pub low_risk_alerts: u32,
    #[schema(example = 3)]
    pub alerts_today: u32,
    #[schema(example = 1200)]
    pub total_trades: u32,
    #[schema(example = 35)]
    pub total_clients: u32,
}

impl From<&DashboardStats> for DashboardStatsResponse {
    fn from(stats: &DashboardStats) -> Self {
        Self {
            total_alerts: stats.total_alerts,
            high_risk_alerts: stats.high_risk_alerts,
            medium_risk_alerts: stats.medium_risk_alerts,
            low_risk_alerts: stats.low_risk_alerts,
            alerts_today: stats.alerts_today,
            total_trades: stats.total_trades,
            total_clients: stats.total_clients,
        }
    }
}

/// 合规评分 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ComplianceScoreResponse {
    /// 0-100 的合规分数，保留两位小数
    #[schema(example = 87.5)]
    pub compliance_score: f64,
    /// 风险分段 (LOW / MEDIUM / HIGH)
    #[schema(example = "LOW")]
    pub risk_level: String,
    /// 参与计算的成交总数
    #[schema(example = 1200)]
    pub total_trades: u32,
    /// 未决告警数
    #[schema(example = 12)]
    pub open_alerts: u32,
    /// 未决 HIGH 告警数
    #[schema(example = 2)]
    pub high_risk_alerts: u32,
}

impl From<&ComplianceReport> for ComplianceScoreResponse {
    fn from(report: &ComplianceReport) -> Self {
        Self {
            compliance_score: report.score.compliance_score,
            risk_level: report.score.risk_level.to_string(),
            total_trades: report.total_trades,
            open_alerts: report.open_alerts,
            high_risk_alerts: report.high_risk_alerts,
        }
    }
}

/// 最近告警摘要 DTO (看板活动流)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecentAlertResponse {
    #[schema(example = "a1b2c3d4-e5f6-7890")]
    pub alert_id: String,
    #[schema(example = "wash_trade")]
    pub rule_name: String,
    #[schema(example = "MEDIUM")]
    pub severity: String,
    #[schema(example = "Client C-002 churned MSFT in 8 trades over 7 days with near-flat position")]
    pub description: String,
    #[schema(example = "2026-03-01T00:00:00Z")]
    pub created_at: String,
}

impl From<&Alert> for RecentAlertResponse {
    fn from(alert: &Alert) -> Self {
        Self {
            alert_id: alert.alert_id.clone(),
            rule_name: alert.rule_name.to_string(),
            severity: alert.severity.to_string(),
            description: alert.description.clone(),
            created_at: alert.created_at.to_rfc3339(),
        }
    }
}

/// 活跃标的 DTO (24 小时窗口)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SymbolActivityResponse {
    #[schema(example = "AAPL")]
    pub symbol: String,
    #[schema(example = 57)]
    pub trade_count: u32,
    #[schema(example = "2026-03-01T00:00:00Z")]
    pub last_trade: String,
}

impl From<&SymbolActivity> for SymbolActivityResponse {
    fn from(activity: &SymbolActivity) -> Self {
        Self {
            symbol: activity.symbol.clone(),
            trade_count: activity.trade_count,
            last_trade: activity.last_trade.to_rfc3339(),
        }
    }
}

/// 最近活动 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecentActivityResponse {
    pub recent_alerts: Vec<RecentAlertResponse>,
    pub active_symbols: Vec<SymbolActivityResponse>,
}

// ============================================================
//  通用响应 DTO
// ============================================================

/// 统一 API 响应包装器
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T: Serialize + ToSchema> {
    /// 是否成功
    pub success: bool,
    /// 数据载荷 (成功时)
    pub data: Option<T>,
    /// 错误信息 (失败时)
    pub error: Option<String>,
}

impl<T: Serialize + ToSchema> ApiResponse<T> {
    /// 构建成功响应
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// 构建失败响应 (不含泛型载荷)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 固定为 false
    pub success: bool,
    /// 错误描述信息
    pub error: String,
}

impl ApiErrorResponse {
    /// 从错误信息构建
    pub fn from_msg(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: msg.into(),
        }
    }
}

/// 健康检查 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// 固定为 "ok"
    #[schema(example = "ok")]
    pub status: String,
    /// 服务名称
    #[schema(example = "vigil-api")]
    pub service: String,
}
