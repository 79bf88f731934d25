use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::entity::{Client, Order, SymbolActivity, TableKind, Trade};
use crate::store::error::StoreError;

/// # Summary
/// 交易数据存储接口，持有上传的委托 / 成交 / 客户三张表。
/// 上传采用整表替换语义（与原控制台一致），检测引擎通过
/// `load_trades` 读取一次性成交快照。
#[async_trait]
pub trait TradeDataStore: Send + Sync {
    /// 替换 trades 表内容，返回写入行数。
    async fn replace_trades(&self, rows: &[Trade]) -> Result<u32, StoreError>;

    /// 替换 orders 表内容，返回写入行数。
    async fn replace_orders(&self, rows: &[Order]) -> Result<u32, StoreError>;

    /// 替换 clients 表内容，返回写入行数。
    async fn replace_clients(&self, rows: &[Client]) -> Result<u32, StoreError>;

    /// 读取全量成交快照，按 timestamp 升序。
    async fn load_trades(&self) -> Result<Vec<Trade>, StoreError>;

    /// 指定表的当前记录数。
    async fn count(&self, kind: TableKind) -> Result<u32, StoreError>;

    /// `since` 之后按标的聚合的成交活跃度，按成交数降序取前 `limit` 个。
    async fn active_symbols(
        &self,
        since: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<SymbolActivity>, StoreError>;

    /// 清空指定表。
    async fn clear(&self, kind: TableKind) -> Result<(), StoreError>;

    /// 清空全部三张数据表。
    async fn clear_all(&self) -> Result<(), StoreError>;
}
