//! # `vigil-manager` - 应用服务层
//!
//! 系统的门面 (Facade)：编排检测运行、数据上传联动与告警复核。
//! 编译期仅依赖 `vigil-core` 中的 Trait 定义，所有具体实现
//! （存储、检测器、迁移策略）通过构造函数注入。

pub mod detection;
pub mod review;

use thiserror::Error;

use vigil_core::rules::error::RuleError;
use vigil_core::store::error::StoreError;

/// # Summary
/// Manager 层的统一错误类型。
#[derive(Error, Debug)]
pub enum ManagerError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Rule error: {0}")]
    Rule(#[from] RuleError),
    /// 检测运行已在进行中，重复触发被拒绝
    #[error("Detection run already in progress")]
    RunInProgress,
    /// 检测阶段失败，本轮未提交任何告警
    #[error("Detection upstream failure: {0}")]
    Upstream(String),
    /// 状态迁移被装配的策略拒绝
    #[error("Transition from {from} to {to} is not allowed")]
    TransitionDenied { from: String, to: String },
    /// 请求携带的枚举值无法解析
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}
