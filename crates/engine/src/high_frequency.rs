use std::collections::BTreeMap;
use tracing::debug;

use vigil_core::alert::entity::Severity;
use vigil_core::detect::entity::{AlertDraft, DetectionInput};
use vigil_core::detect::error::DetectError;
use vigil_core::detect::port::Detector;
use vigil_core::rules::entity::{RuleConfig, RuleName};

/// # Summary
/// 高频交易检测器：单客户在任意小时桶内的成交峰值。
///
/// # Logic
/// 1. 按客户分组，成交落入以 epoch 小时为界的桶。
/// 2. 峰值桶不低于 `trades_per_hour` 时产出告警；
///    不低于 `alert_threshold` 时severity为 HIGH，否则 MEDIUM。
/// 3. 告警主体只有客户，不关联单一标的。
pub struct HighFrequencyDetector;

impl Detector for HighFrequencyDetector {
    fn rule_name(&self) -> RuleName {
        RuleName::HighFrequency
    }

    fn evaluate(
        &self,
        input: &DetectionInput,
        config: &RuleConfig,
    ) -> Result<Vec<AlertDraft>, DetectError> {
        let trades_per_hour = config.int("trades_per_hour").unwrap_or(50);
        let alert_threshold = config.int("alert_threshold").unwrap_or(100);

        // client -> epoch 小时桶 -> 成交数
        let mut buckets: BTreeMap<&str, BTreeMap<i64, i64>> = BTreeMap::new();
        for t in &input.trades {
            let hour = t.timestamp.timestamp().div_euclid(3600);
            *buckets
                .entry(t.client_id.as_str())
                .or_default()
                .entry(hour)
                .or_insert(0) += 1;
        }

        let mut drafts = Vec::new();
        for (client_id, hours) in buckets {
            let Some((&peak_hour, &peak)) = hours.iter().max_by_key(|(_, count)| **count) else {
                continue;
            };
            if peak < trades_per_hour {
                continue;
            }

            let severity = if peak >= alert_threshold {
                Severity::High
            } else {
                Severity::Medium
            };

            debug!(
                "High-frequency pattern: client={} peak={} trades in one hour",
                client_id, peak
            );

            drafts.push(AlertDraft {
                rule_name: RuleName::HighFrequency,
                severity,
                description: format!(
                    "Client {} executed {} trades within a single hour",
                    client_id, peak
                ),
                client_id: Some(client_id.to_string()),
                symbol: None,
                data_json: Some(serde_json::json!({
                    "peak_trades_per_hour": peak,
                    "peak_hour_epoch": peak_hour,
                    "active_hours": hours.len(),
                })),
                fingerprint: AlertDraft::fingerprint_for(RuleName::HighFrequency, client_id, "*"),
            });
        }

        Ok(drafts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{input, trade};
    use rust_decimal_macros::dec;
    use vigil_core::data::entity::{Side, Trade};
    use vigil_core::rules::entity::ParamValue;
    use vigil_core::rules::spec::default_config;

    fn config() -> RuleConfig {
        let mut cfg = default_config(RuleName::HighFrequency).unwrap();
        // 压低阈值便于构造小规模夹具
        cfg.params
            .insert("trades_per_hour".to_string(), ParamValue::Int(10));
        cfg.params
            .insert("alert_threshold".to_string(), ParamValue::Int(50));
        cfg
    }

    fn burst(client: &str, count: i64) -> Vec<Trade> {
        (0..count)
            .map(|i| {
                trade(
                    &format!("{client}-t{i}"),
                    client,
                    "AAPL",
                    Side::Buy,
                    dec!(100.0),
                    // 全部落在同一个小时桶内
                    i % 30,
                )
            })
            .collect()
    }

    #[test]
    fn flags_burst_above_rate() {
        let detector = HighFrequencyDetector;
        let drafts = detector.evaluate(&input(burst("C1", 12)), &config()).unwrap();

        assert_eq!(drafts.len(), 1);
        let d = &drafts[0];
        assert_eq!(d.rule_name, RuleName::HighFrequency);
        assert_eq!(d.client_id.as_deref(), Some("C1"));
        assert_eq!(d.symbol, None);
        assert_eq!(d.severity, Severity::Medium);
        assert_eq!(d.fingerprint, "high_frequency:C1:*");
    }

    #[test]
    fn high_severity_at_alert_threshold() {
        let detector = HighFrequencyDetector;
        let drafts = detector.evaluate(&input(burst("C1", 55)), &config()).unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].severity, Severity::High);
    }

    #[test]
    fn below_rate_stays_quiet() {
        let detector = HighFrequencyDetector;
        let drafts = detector.evaluate(&input(burst("C1", 9)), &config()).unwrap();
        assert!(drafts.is_empty());
    }

    #[test]
    fn spread_out_trades_do_not_accumulate() {
        let detector = HighFrequencyDetector;
        // 12 笔交易各自落在不同小时
        let trades: Vec<Trade> = (0..12)
            .map(|i| {
                trade(
                    &format!("t{i}"),
                    "C1",
                    "AAPL",
                    Side::Buy,
                    dec!(100.0),
                    i * 60,
                )
            })
            .collect();
        let drafts = detector.evaluate(&input(trades), &config()).unwrap();
        assert!(drafts.is_empty());
    }

    #[test]
    fn clients_are_bucketed_independently() {
        let detector = HighFrequencyDetector;
        let mut trades = burst("C1", 12);
        trades.extend(burst("C2", 3));
        let drafts = detector.evaluate(&input(trades), &config()).unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].client_id.as_deref(), Some("C1"));
    }
}
