use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use vigil_core::alert::entity::{Alert, AlertFilter, AlertStats, AlertStatus};
use vigil_core::alert::port::AlertStore;
use vigil_core::detect::entity::AlertDraft;
use vigil_core::store::error::StoreError;

/// 告警数据库文件名
const ALERT_DB: &str = "alerts.db";

/// 未指定 limit 时的默认返回上限
const DEFAULT_LIMIT: u32 = 50;

// 数据库行元组：alert_id, rule_name, severity, description, client_id,
// symbol, status, data_json, fingerprint, created_at
type AlertRow = (
    String,
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    String,
    Option<String>,
    String,
    DateTime<Utc>,
);

/// # Summary
/// AlertStore 的 SQLite 实现。
///
/// # Invariants
/// - `fingerprint` 列带 UNIQUE 索引，重复检测运行的同指纹草稿
///   在插入时被静默跳过，保证不重复告警。
/// - 整批插入运行在单个事务内，失败时全部回滚。
/// - 状态迁移为单条 UPDATE，在 SQLite 行级序列化下原子生效。
pub struct SqliteAlertStore {
    pool: SqlitePool,
}

impl SqliteAlertStore {
    /// # Summary
    /// 创建 SqliteAlertStore 并初始化表结构与索引。
    ///
    /// # Logic
    /// 1. 确保数据根目录存在。
    /// 2. 以 WAL 模式打开（或创建）告警数据库。
    /// 3. 执行 DDL 与过滤索引初始化。
    pub async fn new() -> Result<Self, StoreError> {
        let root = crate::config::get_root_dir();
        std::fs::create_dir_all(&root).map_err(|e| StoreError::InitError(e.to_string()))?;

        let options = SqliteConnectOptions::new()
            .filename(root.join(ALERT_DB))
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .busy_timeout(std::time::Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(|e| StoreError::InitError(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS alerts (
                alert_id TEXT PRIMARY KEY,
                rule_name TEXT NOT NULL,
                severity TEXT NOT NULL,
                description TEXT NOT NULL,
                client_id TEXT,
                symbol TEXT,
                status TEXT NOT NULL DEFAULT 'OPEN',
                data_json TEXT,
                fingerprint TEXT NOT NULL UNIQUE,
                created_at DATETIME NOT NULL
            );
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| StoreError::InitError(e.to_string()))?;

        for ddl in [
            "CREATE INDEX IF NOT EXISTS idx_alerts_created_at ON alerts(created_at)",
            "CREATE INDEX IF NOT EXISTS idx_alerts_severity ON alerts(severity)",
            "CREATE INDEX IF NOT EXISTS idx_alerts_status ON alerts(status)",
            "CREATE INDEX IF NOT EXISTS idx_alerts_client ON alerts(client_id)",
        ] {
            sqlx::query(ddl)
                .execute(&pool)
                .await
                .map_err(|e| StoreError::InitError(e.to_string()))?;
        }

        Ok(Self { pool })
    }

    fn row_to_alert(row: AlertRow) -> Result<Alert, StoreError> {
        let data_json = match row.7 {
            Some(raw) => {
                Some(serde_json::from_str(&raw).map_err(|e| StoreError::Database(e.to_string()))?)
            }
            None => None,
        };
        Ok(Alert {
            alert_id: row.0,
            rule_name: row.1.parse().map_err(StoreError::Database)?,
            severity: row.2.parse().map_err(StoreError::Database)?,
            description: row.3,
            client_id: row.4,
            symbol: row.5,
            status: row.6.parse().map_err(StoreError::Database)?,
            data_json,
            fingerprint: row.8,
            created_at: row.9,
        })
    }

    async fn count_where(&self, sql: &str) -> Result<u32, StoreError> {
        let n: i64 = sqlx::query_scalar(sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(u32::try_from(n).unwrap_or(u32::MAX))
    }
}

#[async_trait]
impl AlertStore for SqliteAlertStore {
    async fn insert_batch(&self, drafts: &[AlertDraft]) -> Result<u32, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let now = Utc::now();
        let mut inserted: u32 = 0;

        for draft in drafts {
            let result = sqlx::query(
                r#"
                INSERT INTO alerts
                    (alert_id, rule_name, severity, description, client_id,
                     symbol, status, data_json, fingerprint, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(fingerprint) DO NOTHING
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(draft.rule_name.to_string())
            .bind(draft.severity.to_string())
            .bind(&draft.description)
            .bind(&draft.client_id)
            .bind(&draft.symbol)
            .bind(AlertStatus::Open.to_string())
            .bind(draft.data_json.as_ref().map(|v| v.to_string()))
            .bind(&draft.fingerprint)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

            if result.rows_affected() > 0 {
                inserted += 1;
            }
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(inserted)
    }

    async fn get(&self, alert_id: &str) -> Result<Alert, StoreError> {
        let row = sqlx::query_as::<_, AlertRow>(
            "SELECT alert_id, rule_name, severity, description, client_id, symbol, status, data_json, fingerprint, created_at FROM alerts WHERE alert_id = ?",
        )
        .bind(alert_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?
        .ok_or(StoreError::NotFound)?;

        Self::row_to_alert(row)
    }

    async fn set_status(&self, alert_id: &str, status: AlertStatus) -> Result<Alert, StoreError> {
        let result = sqlx::query("UPDATE alerts SET status = ? WHERE alert_id = ?")
            .bind(status.to_string())
            .bind(alert_id)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        self.get(alert_id).await
    }

    async fn list(&self, filter: &AlertFilter) -> Result<Vec<Alert>, StoreError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT alert_id, rule_name, severity, description, client_id, symbol, status, data_json, fingerprint, created_at FROM alerts WHERE 1=1",
        );

        if let Some(search) = &filter.search {
            let pattern = format!("%{}%", search.to_lowercase());
            qb.push(" AND (LOWER(description) LIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR LOWER(IFNULL(client_id, '')) LIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR LOWER(IFNULL(symbol, '')) LIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR LOWER(rule_name) LIKE ");
            qb.push_bind(pattern);
            qb.push(")");
        }
        if let Some(status) = filter.status {
            qb.push(" AND status = ");
            qb.push_bind(status.to_string());
        }
        if let Some(severity) = filter.severity {
            qb.push(" AND severity = ");
            qb.push_bind(severity.to_string());
        }
        if let Some(client_id) = &filter.client_id {
            qb.push(" AND client_id = ");
            qb.push_bind(client_id.clone());
        }
        if let Some(rule) = filter.rule_name {
            qb.push(" AND rule_name = ");
            qb.push_bind(rule.to_string());
        }

        qb.push(" ORDER BY created_at DESC, alert_id ASC LIMIT ");
        qb.push_bind(i64::from(filter.limit.unwrap_or(DEFAULT_LIMIT)));
        qb.push(" OFFSET ");
        qb.push_bind(i64::from(filter.offset.unwrap_or(0)));

        let rows = qb
            .build_query_as::<AlertRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_alert).collect()
    }

    async fn recent(&self, limit: u32) -> Result<Vec<Alert>, StoreError> {
        self.list(&AlertFilter {
            limit: Some(limit),
            ..AlertFilter::default()
        })
        .await
    }

    async fn stats(&self) -> Result<AlertStats, StoreError> {
        let today_start = Utc::now()
            .date_naive()
            .and_time(NaiveTime::MIN)
            .and_utc();

        let today: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM alerts WHERE created_at >= ?")
            .bind(today_start)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(AlertStats {
            total_alerts: self.count_where("SELECT COUNT(*) FROM alerts").await?,
            high_alerts: self
                .count_where("SELECT COUNT(*) FROM alerts WHERE severity = 'HIGH'")
                .await?,
            medium_alerts: self
                .count_where("SELECT COUNT(*) FROM alerts WHERE severity = 'MEDIUM'")
                .await?,
            low_alerts: self
                .count_where("SELECT COUNT(*) FROM alerts WHERE severity = 'LOW'")
                .await?,
            alerts_today: u32::try_from(today).unwrap_or(u32::MAX),
            open_alerts: self
                .count_where("SELECT COUNT(*) FROM alerts WHERE status = 'OPEN'")
                .await?,
            in_review_alerts: self
                .count_where("SELECT COUNT(*) FROM alerts WHERE status = 'IN_REVIEW'")
                .await?,
            closed_alerts: self
                .count_where("SELECT COUNT(*) FROM alerts WHERE status = 'CLOSED'")
                .await?,
            false_positive_alerts: self
                .count_where("SELECT COUNT(*) FROM alerts WHERE status = 'FALSE_POSITIVE'")
                .await?,
            open_high_alerts: self
                .count_where(
                    "SELECT COUNT(*) FROM alerts WHERE status = 'OPEN' AND severity = 'HIGH'",
                )
                .await?,
        })
    }

    async fn clear(&self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM alerts")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }
}
