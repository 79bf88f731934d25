//! 检测器测试共用的成交记录构造辅助。

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;

use vigil_core::data::entity::{Side, Trade};
use vigil_core::detect::entity::DetectionInput;

// 固定参考时刻，保证小时桶与窗口边界可复现
pub(crate) fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 12, 30, 0).unwrap()
}

pub(crate) fn trade(
    id: &str,
    client: &str,
    symbol: &str,
    side: Side,
    price: Decimal,
    minutes_before: i64,
) -> Trade {
    Trade {
        trade_id: id.to_string(),
        order_id: None,
        client_id: client.to_string(),
        symbol: symbol.to_string(),
        side,
        quantity: 10,
        price,
        timestamp: base_time() - Duration::minutes(minutes_before),
    }
}

pub(crate) fn trade_with_qty(
    id: &str,
    client: &str,
    symbol: &str,
    side: Side,
    price: Decimal,
    minutes_before: i64,
    quantity: i64,
) -> Trade {
    Trade {
        quantity,
        ..trade(id, client, symbol, side, price, minutes_before)
    }
}

pub(crate) fn input(trades: Vec<Trade>) -> DetectionInput {
    DetectionInput {
        trades,
        now: base_time(),
    }
}
