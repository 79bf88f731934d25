//! # 看板路由控制器
//!
//! 实现 `/api/v1/dashboard` 路径下的只读查询接口：
//! 头部统计、合规评分与最近活动。

use axum::Json;
use axum::extract::State;

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{
    ApiResponse, ComplianceScoreResponse, DashboardStatsResponse, RecentActivityResponse,
    RecentAlertResponse, SymbolActivityResponse,
};

// ============================================================
//  Handler 实现
// ============================================================

/// 看板头部统计
///
/// 按严重度的告警计数加上数据表规模。
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/stats",
    tag = "看板 (Dashboard)",
    responses(
        (status = 200, description = "统计获取成功", body = ApiResponse<DashboardStatsResponse>)
    )
)]
pub async fn dashboard_stats(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DashboardStatsResponse>>, ApiError> {
    let stats = state.review.dashboard_stats().await?;
    Ok(Json(ApiResponse::ok(DashboardStatsResponse::from(&stats))))
}

/// 当前合规评分
///
/// 基于未决告警相对成交规模的占比重新计算，无缓存。
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/compliance-score",
    tag = "看板 (Dashboard)",
    responses(
        (status = 200, description = "评分获取成功", body = ApiResponse<ComplianceScoreResponse>)
    )
)]
pub async fn compliance_score(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ComplianceScoreResponse>>, ApiError> {
    let report = state.review.compliance_score().await?;
    Ok(Json(ApiResponse::ok(ComplianceScoreResponse::from(
        &report,
    ))))
}

/// 最近系统活动
///
/// 最新 10 条告警摘要与 24 小时内最活跃的 5 个标的。
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/recent-activity",
    tag = "看板 (Dashboard)",
    responses(
        (status = 200, description = "活动获取成功", body = ApiResponse<RecentActivityResponse>)
    )
)]
pub async fn recent_activity(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<RecentActivityResponse>>, ApiError> {
    let activity = state.review.recent_activity().await?;
    Ok(Json(ApiResponse::ok(RecentActivityResponse {
        recent_alerts: activity
            .recent_alerts
            .iter()
            .map(RecentAlertResponse::from)
            .collect(),
        active_symbols: activity
            .active_symbols
            .iter()
            .map(SymbolActivityResponse::from)
            .collect(),
    })))
}
