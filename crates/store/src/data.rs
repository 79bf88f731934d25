use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::info;

use vigil_core::data::entity::{Client, Order, Side, SymbolActivity, TableKind, Trade};
use vigil_core::data::port::TradeDataStore;
use vigil_core::store::error::StoreError;

/// 交易数据数据库文件名
const DATA_DB: &str = "surveillance.db";

type TradeRow = (
    String,
    Option<String>,
    String,
    String,
    String,
    i64,
    String,
    DateTime<Utc>,
);

/// # Summary
/// TradeDataStore 的 SQLite 实现，持有 orders / trades / clients 三张表。
///
/// # Invariants
/// - 上传为整表替换：DELETE + 批量 INSERT 运行在同一事务内。
/// - `price` 以 TEXT 存储 Decimal 字符串，读回时精确还原。
pub struct SqliteTradeDataStore {
    pool: SqlitePool,
}

impl SqliteTradeDataStore {
    /// 创建存储实例并初始化三张数据表。
    pub async fn new() -> Result<Self, StoreError> {
        let root = crate::config::get_root_dir();
        std::fs::create_dir_all(&root).map_err(|e| StoreError::InitError(e.to_string()))?;

        let options = SqliteConnectOptions::new()
            .filename(root.join(DATA_DB))
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .busy_timeout(std::time::Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(|e| StoreError::InitError(e.to_string()))?;

        // SQLite 预编译语句一次只接受一条 SQL，逐条执行建表与建索引
        let ddl = [
            r#"
            CREATE TABLE IF NOT EXISTS orders (
                order_id TEXT PRIMARY KEY,
                client_id TEXT NOT NULL,
                trader_id TEXT,
                symbol TEXT NOT NULL,
                side TEXT NOT NULL,
                quantity INTEGER NOT NULL,
                price TEXT NOT NULL,
                timestamp DATETIME NOT NULL,
                order_type TEXT
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS trades (
                trade_id TEXT PRIMARY KEY,
                order_id TEXT,
                client_id TEXT NOT NULL,
                symbol TEXT NOT NULL,
                side TEXT NOT NULL,
                quantity INTEGER NOT NULL,
                price TEXT NOT NULL,
                timestamp DATETIME NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS clients (
                client_id TEXT PRIMARY KEY,
                client_name TEXT NOT NULL,
                client_type TEXT,
                risk_rating TEXT,
                account_status TEXT,
                created_date DATE
            )
            "#,
            "CREATE INDEX IF NOT EXISTS idx_trades_client ON trades(client_id)",
            "CREATE INDEX IF NOT EXISTS idx_trades_symbol ON trades(symbol)",
            "CREATE INDEX IF NOT EXISTS idx_trades_timestamp ON trades(timestamp)",
        ];
        for stmt in ddl {
            sqlx::query(stmt)
                .execute(&pool)
                .await
                .map_err(|e| StoreError::InitError(e.to_string()))?;
        }

        Ok(Self { pool })
    }

    fn table_name(kind: TableKind) -> &'static str {
        match kind {
            TableKind::Orders => "orders",
            TableKind::Trades => "trades",
            TableKind::Clients => "clients",
        }
    }
}

#[async_trait]
impl TradeDataStore for SqliteTradeDataStore {
    async fn replace_trades(&self, rows: &[Trade]) -> Result<u32, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        sqlx::query("DELETE FROM trades")
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        for t in rows {
            sqlx::query(
                r#"
                INSERT OR REPLACE INTO trades
                    (trade_id, order_id, client_id, symbol, side, quantity, price, timestamp)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&t.trade_id)
            .bind(&t.order_id)
            .bind(&t.client_id)
            .bind(&t.symbol)
            .bind(t.side.to_string())
            .bind(t.quantity)
            .bind(t.price.to_string())
            .bind(t.timestamp)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        info!("Replaced trades table with {} rows", rows.len());
        Ok(u32::try_from(rows.len()).unwrap_or(u32::MAX))
    }

    async fn replace_orders(&self, rows: &[Order]) -> Result<u32, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        sqlx::query("DELETE FROM orders")
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        for o in rows {
            sqlx::query(
                r#"
                INSERT OR REPLACE INTO orders
                    (order_id, client_id, trader_id, symbol, side, quantity, price, timestamp, order_type)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&o.order_id)
            .bind(&o.client_id)
            .bind(&o.trader_id)
            .bind(&o.symbol)
            .bind(o.side.to_string())
            .bind(o.quantity)
            .bind(o.price.to_string())
            .bind(o.timestamp)
            .bind(&o.order_type)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        info!("Replaced orders table with {} rows", rows.len());
        Ok(u32::try_from(rows.len()).unwrap_or(u32::MAX))
    }

    async fn replace_clients(&self, rows: &[Client]) -> Result<u32, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        sqlx::query("DELETE FROM clients")
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        for c in rows {
            sqlx::query(
                r#"
                INSERT OR REPLACE INTO clients
                    (client_id, client_name, client_type, risk_rating, account_status, created_date)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&c.client_id)
            .bind(&c.client_name)
            .bind(&c.client_type)
            .bind(&c.risk_rating)
            .bind(&c.account_status)
            .bind(c.created_date)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        info!("Replaced clients table with {} rows", rows.len());
        Ok(u32::try_from(rows.len()).unwrap_or(u32::MAX))
    }

    async fn load_trades(&self) -> Result<Vec<Trade>, StoreError> {
        let rows = sqlx::query_as::<_, TradeRow>(
            "SELECT trade_id, order_id, client_id, symbol, side, quantity, price, timestamp FROM trades ORDER BY timestamp ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        rows.into_iter()
            .map(|row| {
                Ok(Trade {
                    trade_id: row.0,
                    order_id: row.1,
                    client_id: row.2,
                    symbol: row.3,
                    side: Side::from_str(&row.4).map_err(StoreError::Database)?,
                    quantity: row.5,
                    price: Decimal::from_str(&row.6)
                        .map_err(|e| StoreError::Database(e.to_string()))?,
                    timestamp: row.7,
                })
            })
            .collect()
    }

    async fn count(&self, kind: TableKind) -> Result<u32, StoreError> {
        let sql = format!("SELECT COUNT(*) FROM {}", Self::table_name(kind));
        let n: i64 = sqlx::query_scalar(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(u32::try_from(n).unwrap_or(u32::MAX))
    }

    async fn active_symbols(
        &self,
        since: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<SymbolActivity>, StoreError> {
        let rows = sqlx::query_as::<_, (String, i64, DateTime<Utc>)>(
            r#"
            SELECT symbol, COUNT(*) AS trade_count, MAX(timestamp) AS last_trade
            FROM trades
            WHERE timestamp >= ?
            GROUP BY symbol
            ORDER BY trade_count DESC
            LIMIT ?
            "#,
        )
        .bind(since)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(symbol, count, last_trade)| SymbolActivity {
                symbol,
                trade_count: u32::try_from(count).unwrap_or(u32::MAX),
                last_trade,
            })
            .collect())
    }

    async fn clear(&self, kind: TableKind) -> Result<(), StoreError> {
        let sql = format!("DELETE FROM {}", Self::table_name(kind));
        sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }

    async fn clear_all(&self) -> Result<(), StoreError> {
        for kind in [TableKind::Orders, TableKind::Trades, TableKind::Clients] {
            self.clear(kind).await?;
        }
        Ok(())
    }
}
