//! # 告警路由控制器
//!
//! 实现 `/api/v1/alerts` 路径下的 REST 接口：
//! 过滤列表、状态迁移与聚合统计。

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use std::str::FromStr;

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{AlertResponse, AlertStatsResponse, ApiResponse};
use vigil_core::alert::entity::{AlertFilter, AlertStatus, Severity};
use vigil_core::rules::entity::RuleName;

// ============================================================
//  Handler 实现
// ============================================================

#[derive(Deserialize, utoipa::ToSchema)]
pub struct AlertListQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub severity: Option<String>,
    pub client_id: Option<String>,
    pub rule_name: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl AlertListQuery {
    // 无法识别的枚举值整体拒绝，而不是静默忽略过滤条件
    fn into_filter(self) -> Result<AlertFilter, ApiError> {
        let status = self
            .status
            .map(|s| AlertStatus::from_str(&s))
            .transpose()
            .map_err(ApiError::BadRequest)?;
        let severity = self
            .severity
            .map(|s| Severity::from_str(&s))
            .transpose()
            .map_err(ApiError::BadRequest)?;
        let rule_name = self
            .rule_name
            .map(|s| RuleName::from_str(&s))
            .transpose()
            .map_err(ApiError::BadRequest)?;

        Ok(AlertFilter {
            search: self.search,
            status,
            severity,
            client_id: self.client_id,
            rule_name,
            limit: self.limit,
            offset: self.offset,
        })
    }
}

/// 按条件查询告警列表
///
/// 所有过滤条件可选且为 AND 关系；`search` 为大小写不敏感的
/// 子串匹配。结果按创建时间降序排列。
#[utoipa::path(
    get,
    path = "/api/v1/alerts",
    tag = "告警 (Alerts)",
    params(
        ("search" = Option<String>, Query, description = "子串搜索，大小写不敏感"),
        ("status" = Option<String>, Query, description = "复核状态过滤"),
        ("severity" = Option<String>, Query, description = "严重度过滤"),
        ("client_id" = Option<String>, Query, description = "客户过滤"),
        ("rule_name" = Option<String>, Query, description = "规则族过滤"),
        ("limit" = Option<u32>, Query, description = "返回数量限制，默认 50"),
        ("offset" = Option<u32>, Query, description = "跳过的记录数，默认 0")
    ),
    responses(
        (status = 200, description = "告警列表获取成功", body = ApiResponse<Vec<AlertResponse>>),
        (status = 400, description = "过滤条件非法")
    )
)]
pub async fn list_alerts(
    State(state): State<AppState>,
    Query(query): Query<AlertListQuery>,
) -> Result<Json<ApiResponse<Vec<AlertResponse>>>, ApiError> {
    let filter = query.into_filter()?;
    let alerts = state.review.list_alerts(&filter).await?;
    let responses: Vec<AlertResponse> = alerts.iter().map(AlertResponse::from).collect();
    Ok(Json(ApiResponse::ok(responses)))
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct StatusQuery {
    /// 目标状态
    pub status: String,
}

/// 更新告警复核状态
///
/// 迁移须通过装配的状态迁移策略，写入原子生效。
/// 除 `status` 外所有字段保持不变。
#[utoipa::path(
    put,
    path = "/api/v1/alerts/{alert_id}/status",
    tag = "告警 (Alerts)",
    params(
        ("alert_id" = String, Path, description = "告警 ID"),
        ("status" = String, Query, description = "目标状态 (OPEN / IN_REVIEW / CLOSED / FALSE_POSITIVE)")
    ),
    responses(
        (status = 200, description = "状态更新成功", body = ApiResponse<AlertResponse>),
        (status = 400, description = "状态值非法或迁移被拒绝"),
        (status = 404, description = "告警不存在")
    )
)]
pub async fn update_alert_status(
    State(state): State<AppState>,
    Path(alert_id): Path<String>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<ApiResponse<AlertResponse>>, ApiError> {
    let updated = state.review.update_status(&alert_id, &query.status).await?;
    Ok(Json(ApiResponse::ok(AlertResponse::from(&updated))))
}

/// 告警聚合统计
///
/// 按严重度与复核状态的全量计数，每次请求重新计算。
#[utoipa::path(
    get,
    path = "/api/v1/alerts/stats",
    tag = "告警 (Alerts)",
    responses(
        (status = 200, description = "统计获取成功", body = ApiResponse<AlertStatsResponse>)
    )
)]
pub async fn alert_stats(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<AlertStatsResponse>>, ApiError> {
    let stats = state.review.alert_stats().await?;
    Ok(Json(ApiResponse::ok(AlertStatsResponse::from(&stats))))
}
