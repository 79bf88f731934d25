use async_trait::async_trait;

use super::entity::{Alert, AlertFilter, AlertStats, AlertStatus};
use crate::detect::entity::AlertDraft;
use crate::store::error::StoreError;

/// # Summary
/// 告警存储接口，负责告警的持久化、过滤查询、状态迁移与聚合统计。
///
/// # Invariants
/// - `insert_batch` 必须在单个事务内完成：要么整批可见，要么全部回滚。
/// - 指纹相同的草稿静默跳过（重复检测不产生重复告警），返回值只计新插入行。
/// - `set_status` 必须原子生效并对后续读取立即可见。
#[async_trait]
pub trait AlertStore: Send + Sync {
    /// # Summary
    /// 将一轮检测产生的告警草稿整批落库。
    ///
    /// # Returns
    /// 本次真正新插入的告警数量（去重后）。
    async fn insert_batch(&self, drafts: &[AlertDraft]) -> Result<u32, StoreError>;

    /// 根据 ID 获取单条告警，不存在时返回 `StoreError::NotFound`。
    async fn get(&self, alert_id: &str) -> Result<Alert, StoreError>;

    /// # Summary
    /// 将告警状态更新为 `status` 并返回更新后的完整记录。
    ///
    /// # Logic
    /// 1. 单条 UPDATE 语句原子写入新状态。
    /// 2. 影响行数为 0 时返回 `NotFound`。
    /// 3. 回读并返回最新记录，除 `status` 外所有字段保持不变。
    async fn set_status(&self, alert_id: &str, status: AlertStatus) -> Result<Alert, StoreError>;

    /// 按过滤器查询告警，空库返回空列表而非错误。
    async fn list(&self, filter: &AlertFilter) -> Result<Vec<Alert>, StoreError>;

    /// 最近创建的告警 (created_at 降序)。
    async fn recent(&self, limit: u32) -> Result<Vec<Alert>, StoreError>;

    /// 全量聚合统计，读侧投影，不维护冗余计数器。
    async fn stats(&self) -> Result<AlertStats, StoreError>;

    /// 批量清空全部告警（伴随底层数据清除的外部操作，不经过状态机）。
    async fn clear(&self) -> Result<(), StoreError>;
}
