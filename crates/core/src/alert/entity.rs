use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::rules::entity::RuleName;

/// # Summary
/// 告警严重等级，由产生告警的检测规则在创建时设定，创建后不可变更。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "LOW"),
            Severity::Medium => write!(f, "MEDIUM"),
            Severity::High => write!(f, "HIGH"),
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "LOW" => Ok(Severity::Low),
            "MEDIUM" => Ok(Severity::Medium),
            "HIGH" => Ok(Severity::High),
            _ => Err(format!("Unknown Severity: {}", s)),
        }
    }
}

/// # Summary
/// 告警复核状态。`Open` 为检测引擎创建时的初始状态，
/// 状态迁移是否合法由 [`super::policy::TransitionPolicy`] 决定。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertStatus {
    Open,
    InReview,
    Closed,
    FalsePositive,
}

impl std::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertStatus::Open => write!(f, "OPEN"),
            AlertStatus::InReview => write!(f, "IN_REVIEW"),
            AlertStatus::Closed => write!(f, "CLOSED"),
            AlertStatus::FalsePositive => write!(f, "FALSE_POSITIVE"),
        }
    }
}

impl FromStr for AlertStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "OPEN" => Ok(AlertStatus::Open),
            "IN_REVIEW" => Ok(AlertStatus::InReview),
            "CLOSED" => Ok(AlertStatus::Closed),
            "FALSE_POSITIVE" => Ok(AlertStatus::FalsePositive),
            _ => Err(format!("Unknown AlertStatus: {}", s)),
        }
    }
}

/// # Summary
/// `Alert` 聚合根，代表一条被检测到的合规违规记录。
///
/// # Invariants
/// - `alert_id` 在存储生命周期内全局唯一，创建后不可变。
/// - 创建后唯一允许变更的字段是 `status`，其余字段均为不可变的证据内核。
/// - `fingerprint` 用于跨检测轮次去重（rule:client:symbol），不对外暴露。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    // 告警唯一标识 (UUID v4)
    pub alert_id: String,
    // 产生告警的规则族
    pub rule_name: RuleName,
    // 严重等级
    pub severity: Severity,
    // 人类可读的违规描述
    pub description: String,
    // 涉事客户 (外部标识，非本系统所有)
    pub client_id: Option<String>,
    // 涉事标的 (外部标识)
    pub symbol: Option<String>,
    // 复核状态，唯一可变字段
    pub status: AlertStatus,
    // 结构化佐证数据，创建时附加
    pub data_json: Option<serde_json::Value>,
    // 去重指纹，同一规则对同一 (client, symbol) 仅告警一次
    pub fingerprint: String,
    // 创建时间
    pub created_at: DateTime<Utc>,
}

/// # Summary
/// 告警列表查询过滤器。所有条件均为可选，彼此之间为 AND 关系。
///
/// # Invariants
/// - `search` 为大小写不敏感的子串匹配，作用于
///   description / client_id / symbol / rule_name 四个字段。
/// - 结果按 created_at 降序排列，同刻以 alert_id 升序打破平局。
#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    pub search: Option<String>,
    pub status: Option<AlertStatus>,
    pub severity: Option<Severity>,
    pub client_id: Option<String>,
    pub rule_name: Option<RuleName>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// # Summary
/// 告警聚合统计，按需从 AlertStore 重新计算，从不独立持久化。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertStats {
    pub total_alerts: u32,
    pub high_alerts: u32,
    pub medium_alerts: u32,
    pub low_alerts: u32,
    pub alerts_today: u32,
    pub open_alerts: u32,
    pub in_review_alerts: u32,
    pub closed_alerts: u32,
    pub false_positive_alerts: u32,
    // OPEN 且 HIGH 的数量，供合规评分使用
    pub open_high_alerts: u32,
}
