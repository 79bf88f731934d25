//! # 规则配置路由控制器
//!
//! 实现 `/api/v1/rules` 路径下的 REST 接口：配置查询、
//! 参数更新（校验后落库）、开关切换与恢复默认。

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use std::str::FromStr;

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{ApiResponse, RuleConfigResponse, SetEnabledRequest, UpdateParamsRequest};
use vigil_core::rules::entity::{ParamValue, RuleName};
use vigil_core::rules::spec;

// ============================================================
//  Handler 实现
// ============================================================

fn parse_rule(raw: &str) -> Result<RuleName, ApiError> {
    RuleName::from_str(raw).map_err(ApiError::NotFound)
}

/// 列出全部规则族及其当前配置
///
/// 顺序固定为设置页展示顺序。
#[utoipa::path(
    get,
    path = "/api/v1/rules",
    tag = "规则 (Rules)",
    responses(
        (status = 200, description = "规则列表获取成功", body = ApiResponse<Vec<RuleConfigResponse>>)
    )
)]
pub async fn list_rules(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<RuleConfigResponse>>>, ApiError> {
    let responses: Vec<RuleConfigResponse> = state
        .rules
        .list()
        .iter()
        .map(|(rule, config)| RuleConfigResponse::from_config(*rule, config))
        .collect();
    Ok(Json(ApiResponse::ok(responses)))
}

/// 获取单个规则族的当前配置
#[utoipa::path(
    get,
    path = "/api/v1/rules/{rule}",
    tag = "规则 (Rules)",
    params(
        ("rule" = String, Path, description = "规则族名称")
    ),
    responses(
        (status = 200, description = "配置获取成功", body = ApiResponse<RuleConfigResponse>),
        (status = 404, description = "规则族不存在")
    )
)]
pub async fn get_rule(
    State(state): State<AppState>,
    Path(rule): Path<String>,
) -> Result<Json<ApiResponse<RuleConfigResponse>>, ApiError> {
    let rule = parse_rule(&rule)?;
    let config = state.rules.get(rule)?;
    Ok(Json(ApiResponse::ok(RuleConfigResponse::from_config(
        rule, &config,
    ))))
}

/// 更新规则族参数
///
/// 请求内所有参数先按声明的类型与区间整体校验，任何一个
/// 失败都拒绝整个请求，已存配置保持不变。
#[utoipa::path(
    put,
    path = "/api/v1/rules/{rule}/params",
    tag = "规则 (Rules)",
    params(
        ("rule" = String, Path, description = "规则族名称")
    ),
    request_body = UpdateParamsRequest,
    responses(
        (status = 200, description = "参数更新成功", body = ApiResponse<RuleConfigResponse>),
        (status = 400, description = "参数越界或类型不符"),
        (status = 404, description = "规则族不存在")
    )
)]
pub async fn update_rule_params(
    State(state): State<AppState>,
    Path(rule): Path<String>,
    Json(req): Json<UpdateParamsRequest>,
) -> Result<Json<ApiResponse<RuleConfigResponse>>, ApiError> {
    let rule = parse_rule(&rule)?;

    // 先整体校验，全部通过后才写入任何一个参数
    let mut values: Vec<(String, ParamValue)> = Vec::with_capacity(req.params.len());
    for (name, raw) in &req.params {
        let value = ParamValue::from_json(raw)
            .map_err(|e| ApiError::BadRequest(format!("Parameter '{name}': {e}")))?;
        spec::validate(rule, name, &value)?;
        values.push((name.clone(), value));
    }

    let mut config = state.rules.get(rule)?;
    for (name, value) in values {
        config = state.rules.set_parameter(rule, &name, value)?;
    }

    Ok(Json(ApiResponse::ok(RuleConfigResponse::from_config(
        rule, &config,
    ))))
}

/// 切换规则族的启用开关
///
/// 禁用的规则族在检测运行中被跳过，配置保留。
#[utoipa::path(
    put,
    path = "/api/v1/rules/{rule}/enabled",
    tag = "规则 (Rules)",
    params(
        ("rule" = String, Path, description = "规则族名称")
    ),
    request_body = SetEnabledRequest,
    responses(
        (status = 200, description = "开关更新成功", body = ApiResponse<RuleConfigResponse>),
        (status = 404, description = "规则族不存在")
    )
)]
pub async fn set_rule_enabled(
    State(state): State<AppState>,
    Path(rule): Path<String>,
    Json(req): Json<SetEnabledRequest>,
) -> Result<Json<ApiResponse<RuleConfigResponse>>, ApiError> {
    let rule = parse_rule(&rule)?;
    let config = state.rules.set_enabled(rule, req.enabled)?;
    Ok(Json(ApiResponse::ok(RuleConfigResponse::from_config(
        rule, &config,
    ))))
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ResetQuery {
    /// 要重置的规则族，缺省时重置全部
    pub rule: Option<String>,
}

/// 恢复规则配置为内置默认值
#[utoipa::path(
    post,
    path = "/api/v1/rules/reset",
    tag = "规则 (Rules)",
    params(
        ("rule" = Option<String>, Query, description = "要重置的规则族，缺省时重置全部")
    ),
    responses(
        (status = 200, description = "重置完成", body = ApiResponse<Vec<RuleConfigResponse>>),
        (status = 404, description = "规则族不存在")
    )
)]
pub async fn reset_rules(
    State(state): State<AppState>,
    Query(query): Query<ResetQuery>,
) -> Result<Json<ApiResponse<Vec<RuleConfigResponse>>>, ApiError> {
    let rule = query.rule.as_deref().map(parse_rule).transpose()?;
    state.rules.reset(rule)?;

    let responses: Vec<RuleConfigResponse> = state
        .rules
        .list()
        .iter()
        .map(|(rule, config)| RuleConfigResponse::from_config(*rule, config))
        .collect();
    Ok(Json(ApiResponse::ok(responses)))
}
