//! # 合规评分函数
//!
//! 对当前告警总体状态的纯函数投影：每次请求重新计算，无缓存。
//! 分数随未决告警（尤其是 HIGH 级）相对成交量的占比单调下降。

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 风险等级，合规分数的确定性分段。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "LOW"),
            RiskLevel::Medium => write!(f, "MEDIUM"),
            RiskLevel::High => write!(f, "HIGH"),
        }
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "LOW" => Ok(RiskLevel::Low),
            "MEDIUM" => Ok(RiskLevel::Medium),
            "HIGH" => Ok(RiskLevel::High),
            _ => Err(format!("Unknown RiskLevel: {}", s)),
        }
    }
}

/// 评分输入：告警库与数据源的当前快照计数。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreInput {
    pub total_trades: u32,
    pub open_alerts: u32,
    pub open_high_alerts: u32,
}

/// 评分输出：0-100 的分数与其风险分段。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComplianceScore {
    pub compliance_score: f64,
    pub risk_level: RiskLevel,
}

// 分段切点：> 80 为 LOW，> 60 为 MEDIUM，其余为 HIGH。
const LOW_CUTOFF: f64 = 80.0;
const MEDIUM_CUTOFF: f64 = 60.0;

/// # Summary
/// 计算合规分数。
///
/// # Logic
/// 1. 无成交数据时返回满分基线 100 / LOW（空库不会失败）。
/// 2. 否则 score = 100 − (open/trades)·1000 − (open_high/trades)·2000，
///    截断到 [0, 100]，保留两位小数。
/// 3. 风险等级为分数的确定性分段。
///
/// 未决 HIGH 告警每多一条，open 与 open_high 同时加一，扣减项
/// 只增不减，因此分数单调非增。
pub fn compute(input: ScoreInput) -> ComplianceScore {
    let score = if input.total_trades == 0 {
        100.0
    } else {
        let trades = f64::from(input.total_trades);
        let alert_ratio = f64::from(input.open_alerts) / trades;
        let high_ratio = f64::from(input.open_high_alerts) / trades;
        let raw = 100.0 - alert_ratio * 1000.0 - high_ratio * 2000.0;
        (raw.clamp(0.0, 100.0) * 100.0).round() / 100.0
    };

    let risk_level = if score > LOW_CUTOFF {
        RiskLevel::Low
    } else if score > MEDIUM_CUTOFF {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    };

    ComplianceScore {
        compliance_score: score,
        risk_level,
    }
}
