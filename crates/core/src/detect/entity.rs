use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::alert::entity::Severity;
use crate::data::entity::Trade;
use crate::rules::entity::RuleName;

/// # Summary
/// 检测引擎的输入：一轮运行开始时读取的成交快照与参考时刻。
/// 运行期间的数据写入不影响本轮求值。
#[derive(Debug, Clone)]
pub struct DetectionInput {
    pub trades: Vec<Trade>,
    pub now: DateTime<Utc>,
}

/// # Summary
/// 检测器产出的告警草稿。落库时由 AlertStore 赋予
/// alert_id / status=OPEN / created_at。
///
/// # Invariants
/// - `fingerprint` 对同一 (rule, client, symbol) 组合保持稳定，
///   重复运行产出的同指纹草稿在落库时被静默去重。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertDraft {
    pub rule_name: RuleName,
    pub severity: Severity,
    pub description: String,
    pub client_id: Option<String>,
    pub symbol: Option<String>,
    pub data_json: Option<serde_json::Value>,
    pub fingerprint: String,
}

impl AlertDraft {
    /// 规则对 (client, symbol) 主体的标准指纹。
    pub fn fingerprint_for(rule: RuleName, client_id: &str, symbol: &str) -> String {
        format!("{}:{}:{}", rule, client_id, symbol)
    }
}

/// # Summary
/// 检测运行的任务句柄状态，供 fire-and-poll 查询。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunStatus {
    /// 尚未运行过
    Idle,
    /// 正在运行，重复触发会被拒绝而非并行执行
    Running { started_at: DateTime<Utc> },
    /// 上一轮成功结束
    Completed {
        alerts_generated: u32,
        finished_at: DateTime<Utc>,
    },
    /// 上一轮失败，未提交任何告警
    Failed { error: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable() {
        let a = AlertDraft::fingerprint_for(RuleName::SelfTrade, "C1", "AAPL");
        let b = AlertDraft::fingerprint_for(RuleName::SelfTrade, "C1", "AAPL");
        assert_eq!(a, b);
        assert_eq!(a, "self_trade:C1:AAPL");
    }
}
