use chrono::Duration;
use rust_decimal::prelude::ToPrimitive;
use std::collections::BTreeMap;
use tracing::debug;

use vigil_core::alert::entity::Severity;
use vigil_core::data::entity::{Side, Trade};
use vigil_core::detect::entity::{AlertDraft, DetectionInput};
use vigil_core::detect::error::DetectError;
use vigil_core::detect::port::Detector;
use vigil_core::rules::entity::{RuleConfig, RuleName};

/// # Summary
/// 洗售检测器：高换手但净仓位几乎不变的客户。
///
/// # Logic
/// 1. 只保留 `time_window_days` 窗口内的交易，按 (client_id, symbol) 分组。
/// 2. 组内交易不少于 `min_trade_count`，且净仓占比
///    `|net_qty| / gross_qty` 不超过 `position_threshold` 时产出告警。
/// 3. 净仓占比不超过阈值一半时severity为 HIGH，否则 MEDIUM。
pub struct WashTradeDetector;

impl Detector for WashTradeDetector {
    fn rule_name(&self) -> RuleName {
        RuleName::WashTrade
    }

    fn evaluate(
        &self,
        input: &DetectionInput,
        config: &RuleConfig,
    ) -> Result<Vec<AlertDraft>, DetectError> {
        let window_days = config.int("time_window_days").unwrap_or(7);
        let min_trade_count = config.int("min_trade_count").unwrap_or(6);
        let position_threshold = config.fraction("position_threshold").unwrap_or(0.1);

        let cutoff = input.now - Duration::days(window_days);

        let mut groups: BTreeMap<(&str, &str), Vec<&Trade>> = BTreeMap::new();
        for t in &input.trades {
            if t.timestamp < cutoff {
                continue;
            }
            groups
                .entry((t.client_id.as_str(), t.symbol.as_str()))
                .or_default()
                .push(t);
        }

        let mut drafts = Vec::new();
        for ((client_id, symbol), trades) in groups {
            if trades.len() < usize::try_from(min_trade_count).unwrap_or(usize::MAX) {
                continue;
            }

            let mut net_qty: i64 = 0;
            let mut gross_qty: i64 = 0;
            let mut notional = rust_decimal::Decimal::ZERO;
            for t in &trades {
                match t.side {
                    Side::Buy => net_qty += t.quantity,
                    Side::Sell => net_qty -= t.quantity,
                }
                gross_qty += t.quantity;
                notional += t.price * rust_decimal::Decimal::from(t.quantity);
            }

            if gross_qty == 0 {
                continue;
            }
            let net_ratio = (rust_decimal::Decimal::from(net_qty.abs())
                / rust_decimal::Decimal::from(gross_qty))
            .to_f64()
            .unwrap_or(1.0);
            if net_ratio > position_threshold {
                continue;
            }

            let severity = if net_ratio * 2.0 <= position_threshold {
                Severity::High
            } else {
                Severity::Medium
            };

            debug!(
                "Wash-trade pattern: client={} symbol={} trades={} net_ratio={:.4}",
                client_id,
                symbol,
                trades.len(),
                net_ratio
            );

            drafts.push(AlertDraft {
                rule_name: RuleName::WashTrade,
                severity,
                description: format!(
                    "Client {} churned {} in {} trades over {} days with near-flat position",
                    client_id,
                    symbol,
                    trades.len(),
                    window_days
                ),
                client_id: Some(client_id.to_string()),
                symbol: Some(symbol.to_string()),
                data_json: Some(serde_json::json!({
                    "trade_count": trades.len(),
                    "net_quantity": net_qty,
                    "gross_quantity": gross_qty,
                    "net_position_ratio": net_ratio,
                    "gross_notional": notional.to_f64().unwrap_or(0.0),
                })),
                fingerprint: AlertDraft::fingerprint_for(RuleName::WashTrade, client_id, symbol),
            });
        }

        Ok(drafts)
    }
}
