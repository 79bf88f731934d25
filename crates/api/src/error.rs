//! # API 统一错误处理
//!
//! 将下层各 crate 的错误类型统一映射到 HTTP 状态码与 JSON 响应体。

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::types::ApiErrorResponse;
use vigil_core::rules::error::RuleError;
use vigil_core::store::error::StoreError;
use vigil_manager::ManagerError;

/// API 层统一错误枚举
#[derive(Error, Debug)]
pub enum ApiError {
    /// 资源未找到 (404)
    #[error("资源未找到: {0}")]
    NotFound(String),

    /// 请求参数错误 (400)
    #[error("请求参数错误: {0}")]
    BadRequest(String),

    /// 状态冲突，如检测运行已在进行中 (409)
    #[error("操作冲突: {0}")]
    Conflict(String),

    /// 检测链路失败，本轮未提交任何告警 (502)
    #[error("检测链路失败: {0}")]
    BadGateway(String),

    /// 下层业务错误 (500)
    #[error("内部服务错误: {0}")]
    Internal(String),
}

/// 将 `ApiError` 转换为 axum 的 HTTP 响应
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            ApiError::Internal(msg) => {
                // 内部错误只记录日志，不向客户端透传细节
                tracing::error!("内部服务错误: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "服务器内部错误".to_string(),
                )
            }
        };

        let body = Json(ApiErrorResponse::from_msg(message));
        (status, body).into_response()
    }
}

/// 从 `ManagerError` 转换
impl From<ManagerError> for ApiError {
    fn from(err: ManagerError) -> Self {
        match &err {
            ManagerError::Store(store) => store_to_api(store, &err),
            ManagerError::Rule(rule) => rule_to_api(rule),
            ManagerError::RunInProgress => ApiError::Conflict(err.to_string()),
            ManagerError::Upstream(_) => ApiError::BadGateway(err.to_string()),
            ManagerError::TransitionDenied { .. } | ManagerError::InvalidValue(_) => {
                ApiError::BadRequest(err.to_string())
            }
        }
    }
}

/// 从 `RuleError` 转换
impl From<RuleError> for ApiError {
    fn from(err: RuleError) -> Self {
        rule_to_api(&err)
    }
}

/// 从 `StoreError` 转换
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        store_to_api(&err, &err)
    }
}

fn rule_to_api(err: &RuleError) -> ApiError {
    match err {
        RuleError::UnknownRule(_) => ApiError::NotFound(err.to_string()),
        RuleError::UnknownParameter { .. }
        | RuleError::OutOfRange { .. }
        | RuleError::WrongType { .. } => ApiError::BadRequest(err.to_string()),
    }
}

fn store_to_api(store: &StoreError, display: &impl std::fmt::Display) -> ApiError {
    match store {
        StoreError::NotFound => ApiError::NotFound(display.to_string()),
        StoreError::Conflict(_) => ApiError::Conflict(display.to_string()),
        StoreError::Database(_) | StoreError::InitError(_) => {
            ApiError::Internal(display.to_string())
        }
    }
}
