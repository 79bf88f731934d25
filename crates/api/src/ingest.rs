//! # CSV 摄入解析
//!
//! 将上传的 CSV 字节流解析为领域实体。列名大小写敏感但允许
//! 前后空白；可选列缺失时以空值填充，必需列缺失则整体拒绝。

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::StringRecord;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::ApiError;
use vigil_core::data::entity::{Client, Order, Side, TableKind, Trade};

/// 解析 `table_type` 表单字段。
pub fn parse_table_kind(table_type: &str) -> Result<TableKind, ApiError> {
    TableKind::from_str(table_type)
        .map_err(|_| ApiError::BadRequest(format!("Invalid table type: {table_type}")))
}

/// CSV 表头到列下标的映射，带空白清理。
struct Header {
    columns: Vec<String>,
}

impl Header {
    fn new(record: &StringRecord) -> Self {
        Self {
            columns: record.iter().map(|c| c.trim().to_string()).collect(),
        }
    }

    fn index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// 必需列缺失时整体拒绝
    fn require(&self, names: &[&str]) -> Result<(), ApiError> {
        let missing: Vec<&str> = names
            .iter()
            .copied()
            .filter(|n| self.index(n).is_none())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ApiError::BadRequest(format!(
                "Missing required columns: {missing:?}"
            )))
        }
    }

    fn get<'a>(&self, record: &'a StringRecord, name: &str) -> Option<&'a str> {
        let value = self.index(name).and_then(|i| record.get(i))?.trim();
        if value.is_empty() { None } else { Some(value) }
    }
}

/// 解析上传的 CSV trades 表。
pub fn parse_trades(bytes: &[u8]) -> Result<Vec<Trade>, ApiError> {
    let mut reader = csv_reader(bytes)?;
    let header = read_header(&mut reader)?;
    header.require(&[
        "trade_id", "client_id", "symbol", "side", "quantity", "price", "timestamp",
    ])?;

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| bad_row(line, &e.to_string()))?;
        rows.push(Trade {
            trade_id: required(&header, &record, line, "trade_id")?.to_string(),
            order_id: header.get(&record, "order_id").map(str::to_string),
            client_id: required(&header, &record, line, "client_id")?.to_string(),
            symbol: required(&header, &record, line, "symbol")?.to_string(),
            side: parse_side(required(&header, &record, line, "side")?, line)?,
            quantity: parse_quantity(required(&header, &record, line, "quantity")?, line)?,
            price: parse_price(required(&header, &record, line, "price")?, line)?,
            timestamp: parse_timestamp(required(&header, &record, line, "timestamp")?, line)?,
        });
    }
    Ok(rows)
}

/// 解析上传的 CSV orders 表。
pub fn parse_orders(bytes: &[u8]) -> Result<Vec<Order>, ApiError> {
    let mut reader = csv_reader(bytes)?;
    let header = read_header(&mut reader)?;
    header.require(&[
        "order_id", "client_id", "symbol", "side", "quantity", "price", "timestamp",
    ])?;

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| bad_row(line, &e.to_string()))?;
        rows.push(Order {
            order_id: required(&header, &record, line, "order_id")?.to_string(),
            client_id: required(&header, &record, line, "client_id")?.to_string(),
            trader_id: header.get(&record, "trader_id").map(str::to_string),
            symbol: required(&header, &record, line, "symbol")?.to_string(),
            side: parse_side(required(&header, &record, line, "side")?, line)?,
            quantity: parse_quantity(required(&header, &record, line, "quantity")?, line)?,
            price: parse_price(required(&header, &record, line, "price")?, line)?,
            timestamp: parse_timestamp(required(&header, &record, line, "timestamp")?, line)?,
            order_type: header.get(&record, "order_type").map(str::to_string),
        });
    }
    Ok(rows)
}

/// 解析上传的 CSV clients 表。
pub fn parse_clients(bytes: &[u8]) -> Result<Vec<Client>, ApiError> {
    let mut reader = csv_reader(bytes)?;
    let header = read_header(&mut reader)?;
    header.require(&["client_id", "client_name"])?;

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| bad_row(line, &e.to_string()))?;
        let created_date = match header.get(&record, "created_date") {
            Some(raw) => Some(parse_date(raw, line)?),
            None => None,
        };
        rows.push(Client {
            client_id: required(&header, &record, line, "client_id")?.to_string(),
            client_name: required(&header, &record, line, "client_name")?.to_string(),
            client_type: header.get(&record, "client_type").map(str::to_string),
            risk_rating: header.get(&record, "risk_rating").map(str::to_string),
            account_status: header.get(&record, "account_status").map(str::to_string),
            created_date,
        });
    }
    Ok(rows)
}

fn csv_reader(bytes: &[u8]) -> Result<csv::Reader<&[u8]>, ApiError> {
    if bytes.is_empty() {
        return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
    }
    Ok(csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes))
}

fn read_header(reader: &mut csv::Reader<&[u8]>) -> Result<Header, ApiError> {
    let mut record = StringRecord::new();
    let has_row = reader
        .read_record(&mut record)
        .map_err(|e| ApiError::BadRequest(format!("Invalid CSV: {e}")))?;
    if !has_row {
        return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
    }
    Ok(Header::new(&record))
}

fn required<'a>(
    header: &Header,
    record: &'a StringRecord,
    line: usize,
    name: &str,
) -> Result<&'a str, ApiError> {
    header
        .get(record, name)
        .ok_or_else(|| bad_row(line, &format!("missing value for '{name}'")))
}

fn bad_row(line: usize, detail: &str) -> ApiError {
    // 行号从 1 起，另加表头行
    ApiError::BadRequest(format!("Row {}: {}", line + 2, detail))
}

fn parse_side(raw: &str, line: usize) -> Result<Side, ApiError> {
    Side::from_str(raw).map_err(|e| bad_row(line, &e))
}

fn parse_quantity(raw: &str, line: usize) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| bad_row(line, &format!("invalid quantity '{raw}'")))
}

fn parse_price(raw: &str, line: usize) -> Result<Decimal, ApiError> {
    Decimal::from_str(raw).map_err(|_| bad_row(line, &format!("invalid price '{raw}'")))
}

// 时间戳兼容 ISO 8601 与无时区的 "YYYY-MM-DD HH:MM:SS"，后者按 UTC 解释
fn parse_timestamp(raw: &str, line: usize) -> Result<DateTime<Utc>, ApiError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    Err(bad_row(line, &format!("invalid timestamp '{raw}'")))
}

fn parse_date(raw: &str, line: usize) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| bad_row(line, &format!("invalid date '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_trades_with_optional_order_id() {
        let csv = b"trade_id,order_id,client_id,symbol,side,quantity,price,timestamp\n\
            T1,O1,C1,AAPL,BUY,100,150.25,2026-03-01T10:00:00Z\n\
            T2,,C1,AAPL,sell,50,150.30,2026-03-01 10:05:00\n";
        let rows = parse_trades(csv).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].order_id.as_deref(), Some("O1"));
        assert_eq!(rows[0].price, dec!(150.25));
        assert_eq!(rows[1].order_id, None);
        assert_eq!(rows[1].side, Side::Sell);
        assert_eq!(rows[1].timestamp.to_rfc3339(), "2026-03-01T10:05:00+00:00");
    }

    #[test]
    fn header_whitespace_is_trimmed() {
        let csv = b"trade_id, client_id ,symbol,side,quantity,price,timestamp\n\
            T1,C1,AAPL,BUY,100,150.25,2026-03-01T10:00:00Z\n";
        let rows = parse_trades(csv).unwrap();
        assert_eq!(rows[0].client_id, "C1");
    }

    #[test]
    fn missing_required_column_is_rejected() {
        let csv = b"trade_id,client_id,side,quantity,price,timestamp\n";
        let err = parse_trades(csv).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(msg) if msg.contains("symbol")));
    }

    #[test]
    fn empty_file_is_rejected() {
        assert!(matches!(
            parse_trades(b"").unwrap_err(),
            ApiError::BadRequest(_)
        ));
    }

    #[test]
    fn invalid_quantity_names_the_row() {
        let csv = b"trade_id,client_id,symbol,side,quantity,price,timestamp\n\
            T1,C1,AAPL,BUY,lots,150.25,2026-03-01T10:00:00Z\n";
        let err = parse_trades(csv).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(msg) if msg.contains("Row 2")));
    }

    #[test]
    fn parses_clients_with_sparse_optional_columns() {
        let csv = b"client_id,client_name,created_date\n\
            C1,Acme Fund,2024-01-15\n\
            C2,Beta Capital,\n";
        let rows = parse_clients(csv).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].created_date,
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert_eq!(rows[1].created_date, None);
        assert_eq!(rows[1].client_type, None);
    }

    #[test]
    fn unknown_table_type_is_rejected() {
        assert!(parse_table_kind("alerts").is_err());
        assert_eq!(parse_table_kind("trades").unwrap(), TableKind::Trades);
    }
}
