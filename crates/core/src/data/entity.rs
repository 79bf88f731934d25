use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// # Summary
/// 交易方向。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    Buy,
    Sell,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            _ => Err(format!("Unknown Side: {}", s)),
        }
    }
}

/// # Summary
/// 成交记录实体，检测引擎的主要输入。
///
/// # Invariants
/// - `trade_id` 在表内唯一。
/// - `quantity` 为正整数，`price` 非负。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub trade_id: String,
    pub order_id: Option<String>,
    pub client_id: String,
    pub symbol: String,
    pub side: Side,
    pub quantity: i64,
    pub price: Decimal,
    pub timestamp: DateTime<Utc>,
}

/// 委托记录实体。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub client_id: String,
    pub trader_id: Option<String>,
    pub symbol: String,
    pub side: Side,
    pub quantity: i64,
    pub price: Decimal,
    pub timestamp: DateTime<Utc>,
    pub order_type: Option<String>,
}

/// 客户主数据实体。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub client_id: String,
    pub client_name: String,
    pub client_type: Option<String>,
    pub risk_rating: Option<String>,
    pub account_status: Option<String>,
    pub created_date: Option<NaiveDate>,
}

/// # Summary
/// 可上传/可清空的数据表类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Orders,
    Trades,
    Clients,
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableKind::Orders => write!(f, "orders"),
            TableKind::Trades => write!(f, "trades"),
            TableKind::Clients => write!(f, "clients"),
        }
    }
}

impl FromStr for TableKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "orders" => Ok(TableKind::Orders),
            "trades" => Ok(TableKind::Trades),
            "clients" => Ok(TableKind::Clients),
            _ => Err(format!("Unknown table type: {}", s)),
        }
    }
}

/// 24 小时窗口内按标的聚合的成交活跃度，供仪表盘展示。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolActivity {
    pub symbol: String,
    pub trade_count: u32,
    pub last_trade: DateTime<Utc>,
}
