//! # 数据上传与检测路由控制器
//!
//! 实现 `/api/v1/data` 路径下的 REST 接口：CSV 上传（整表替换）、
//! 手动检测触发、运行状态轮询、表规模查询与批量清除。

use axum::Json;
use axum::extract::{Multipart, Query, State};
use serde::Deserialize;

use crate::error::ApiError;
use crate::ingest;
use crate::server::AppState;
use crate::types::{
    ApiResponse, DetectionRunResponse, RunStatusResponse, TableInfoResponse, UploadResponse,
};
use vigil_core::data::entity::TableKind;

// ============================================================
//  Handler 实现
// ============================================================

/// 上传 CSV 数据文件
///
/// 整表替换目标表的内容。上传 trades 时自动联动一轮检测，
/// 检测失败只记录日志，不影响上传本身的结果。
#[utoipa::path(
    post,
    path = "/api/v1/data/upload/csv",
    tag = "数据 (Data)",
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "上传成功", body = ApiResponse<UploadResponse>),
        (status = 400, description = "文件或表类型非法")
    )
)]
pub async fn upload_csv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<UploadResponse>>, ApiError> {
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut file_name = String::new();
    let mut table_type: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        match field.name() {
            Some("file") => {
                file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {e}")))?;
                file_bytes = Some(bytes.to_vec());
            }
            Some("table_type") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read field: {e}")))?;
                table_type = Some(text);
            }
            _ => {}
        }
    }

    let bytes = file_bytes
        .ok_or_else(|| ApiError::BadRequest("Please upload a CSV file".to_string()))?;
    if !file_name.to_lowercase().ends_with(".csv") {
        return Err(ApiError::BadRequest(
            "Please upload a CSV file".to_string(),
        ));
    }
    let kind = ingest::parse_table_kind(
        &table_type.ok_or_else(|| ApiError::BadRequest("Missing table_type".to_string()))?,
    )?;

    let outcome = match kind {
        TableKind::Trades => {
            let rows = ingest::parse_trades(&bytes)?;
            state.detection.upload_trades(&rows).await?
        }
        TableKind::Orders => {
            let rows = ingest::parse_orders(&bytes)?;
            state.detection.upload_orders(&rows).await?
        }
        TableKind::Clients => {
            let rows = ingest::parse_clients(&bytes)?;
            state.detection.upload_clients(&rows).await?
        }
    };

    Ok(Json(ApiResponse::ok(UploadResponse {
        message: format!(
            "Successfully uploaded {} records to {}",
            outcome.records_uploaded, kind
        ),
        records_uploaded: outcome.records_uploaded,
        table_type: kind.to_string(),
        new_alerts_generated: outcome.new_alerts.unwrap_or(0),
    })))
}

/// 手动触发一轮检测
///
/// 已有运行在进行中时返回 409，绝不并行执行第二轮。
#[utoipa::path(
    post,
    path = "/api/v1/data/run-detection",
    tag = "数据 (Data)",
    responses(
        (status = 200, description = "检测完成", body = ApiResponse<DetectionRunResponse>),
        (status = 409, description = "已有检测运行在进行中"),
        (status = 502, description = "检测链路失败，本轮未提交任何告警")
    )
)]
pub async fn run_detection(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DetectionRunResponse>>, ApiError> {
    let alerts_generated = state.detection.run_detection().await?;
    Ok(Json(ApiResponse::ok(DetectionRunResponse {
        message: "Detection completed successfully".to_string(),
        alerts_generated,
    })))
}

/// 查询最近一轮检测的运行状态
#[utoipa::path(
    get,
    path = "/api/v1/data/run-status",
    tag = "数据 (Data)",
    responses(
        (status = 200, description = "状态获取成功", body = ApiResponse<RunStatusResponse>)
    )
)]
pub async fn run_status(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<RunStatusResponse>>, ApiError> {
    let status = state.detection.run_status().await;
    Ok(Json(ApiResponse::ok(RunStatusResponse::from(&status))))
}

/// 查询各数据表的当前记录数
#[utoipa::path(
    get,
    path = "/api/v1/data/tables/info",
    tag = "数据 (Data)",
    responses(
        (status = 200, description = "表信息获取成功", body = ApiResponse<TableInfoResponse>)
    )
)]
pub async fn tables_info(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<TableInfoResponse>>, ApiError> {
    let counts = state.detection.table_counts().await?;
    Ok(Json(ApiResponse::ok(TableInfoResponse::from(&counts))))
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ClearQuery {
    /// 目标表 (orders / trades / clients)
    pub table_type: String,
}

/// 清空指定数据表
///
/// 状态机之外的批量删除，告警库不受影响。
#[utoipa::path(
    delete,
    path = "/api/v1/data/clear",
    tag = "数据 (Data)",
    params(
        ("table_type" = String, Query, description = "目标表 (orders / trades / clients)")
    ),
    responses(
        (status = 200, description = "清空完成", body = ApiResponse<String>),
        (status = 400, description = "表类型非法")
    )
)]
pub async fn clear_table(
    State(state): State<AppState>,
    Query(query): Query<ClearQuery>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    let kind = ingest::parse_table_kind(&query.table_type)?;
    state.detection.clear_table(kind).await?;
    Ok(Json(ApiResponse::ok(format!("Cleared table {kind}"))))
}

/// 清空全部数据表与告警库
#[utoipa::path(
    delete,
    path = "/api/v1/data/clear-all",
    tag = "数据 (Data)",
    responses(
        (status = 200, description = "清空完成", body = ApiResponse<String>)
    )
)]
pub async fn clear_all(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    state.detection.clear_all().await?;
    Ok(Json(ApiResponse::ok(
        "Cleared all data tables and alerts".to_string(),
    )))
}
