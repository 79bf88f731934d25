use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::debug;

use vigil_core::alert::entity::Severity;
use vigil_core::data::entity::Trade;
use vigil_core::detect::entity::{AlertDraft, DetectionInput};
use vigil_core::detect::error::DetectError;
use vigil_core::detect::port::Detector;
use vigil_core::rules::entity::{RuleConfig, RuleName};

// 低于此数量的对敲腿不足以构成模式
const MIN_OFFSETTING_TRADES: u32 = 2;

/// # Summary
/// 自成交检测器：同一客户在同一标的上、时间窗口内的成对交易。
///
/// # Logic
/// 1. 按 (client_id, symbol) 分组。
/// 2. 统计组内时间差不超过 `time_window_hours` 的有序交易对数量
///    (trade_pairs)，其中方向相反的为对敲对 (offsetting_trades)。
/// 3. `trade_pairs >= min_trade_pairs` 且对敲对不少于 2 时产出告警；
///    对敲占比超过 `offsetting_threshold` 时severity为 HIGH，否则 MEDIUM。
pub struct SelfTradeDetector;

impl Detector for SelfTradeDetector {
    fn rule_name(&self) -> RuleName {
        RuleName::SelfTrade
    }

    fn evaluate(
        &self,
        input: &DetectionInput,
        config: &RuleConfig,
    ) -> Result<Vec<AlertDraft>, DetectError> {
        let window_hours = config.int("time_window_hours").unwrap_or(24);
        let min_trade_pairs = config.int("min_trade_pairs").unwrap_or(4);
        let offsetting_threshold = config.fraction("offsetting_threshold").unwrap_or(0.7);

        let mut groups: BTreeMap<(&str, &str), Vec<&Trade>> = BTreeMap::new();
        for t in &input.trades {
            groups
                .entry((t.client_id.as_str(), t.symbol.as_str()))
                .or_default()
                .push(t);
        }

        let mut drafts = Vec::new();
        for ((client_id, symbol), trades) in groups {
            let mut pairs: u32 = 0;
            let mut offsetting: u32 = 0;
            let mut price_diff_sum = Decimal::ZERO;

            for (i, a) in trades.iter().enumerate() {
                for (j, b) in trades.iter().enumerate() {
                    if i == j {
                        continue;
                    }
                    // 按秒比较，整小时截断会把 24h59m 误算进 24 小时窗口
                    let gap = (a.timestamp - b.timestamp).num_seconds().abs();
                    if gap > window_hours.saturating_mul(3600) {
                        continue;
                    }
                    pairs = pairs.saturating_add(1);
                    price_diff_sum += (a.price - b.price).abs();
                    if a.side != b.side {
                        offsetting = offsetting.saturating_add(1);
                    }
                }
            }

            if offsetting < MIN_OFFSETTING_TRADES || i64::from(pairs) < min_trade_pairs {
                continue;
            }

            let offsetting_ratio = f64::from(offsetting) / f64::from(pairs);
            let severity = if offsetting_ratio > offsetting_threshold {
                Severity::High
            } else {
                Severity::Medium
            };
            let avg_price_diff = (price_diff_sum / Decimal::from(pairs))
                .to_f64()
                .unwrap_or(0.0);

            debug!(
                "Self-trade pattern: client={} symbol={} pairs={} offsetting={}",
                client_id, symbol, pairs, offsetting
            );

            drafts.push(AlertDraft {
                rule_name: RuleName::SelfTrade,
                severity,
                description: format!(
                    "Client {} executed {} offsetting trades in {} within {} hours",
                    client_id, offsetting, symbol, window_hours
                ),
                client_id: Some(client_id.to_string()),
                symbol: Some(symbol.to_string()),
                data_json: Some(serde_json::json!({
                    "trade_pairs": pairs,
                    "offsetting_trades": offsetting,
                    "avg_price_difference": avg_price_diff,
                    "risk_score": (offsetting_ratio * 100.0).min(100.0),
                })),
                fingerprint: AlertDraft::fingerprint_for(RuleName::SelfTrade, client_id, symbol),
            });
        }

        Ok(drafts)
    }
}
