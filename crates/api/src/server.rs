//! # API 服务启动器
//!
//! 组装 axum 路由、挂载 Swagger UI、配置 CORS 并绑定 TCP 端口对外提供服务。
//! 本模块不直接启动 `main()`, 而是由 `crates/app` 的 DI 容器持有并调用。

use std::sync::Arc;

use axum::Json;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use utoipa_swagger_ui::SwaggerUi;

use vigil_core::rules::port::RuleStore;
use vigil_manager::detection::DetectionManager;
use vigil_manager::review::ReviewService;

use crate::routes::{alerts, dashboard, data, rules};
use crate::types::{ApiResponse, HealthResponse};

// ============================================================
//  共享应用状态
// ============================================================

/// 全局应用状态，通过 axum 的 `State` 提取器注入到每个 Handler 中。
///
/// # Invariants
/// - 所有字段在服务启动前由 DI 容器注入，生命周期与进程等同。
#[derive(Clone)]
pub struct AppState {
    /// 检测管理器 (Facade)
    pub detection: Arc<DetectionManager>,
    /// 告警复核与看板查询服务
    pub review: Arc<ReviewService>,
    /// 规则配置存储 (用于配置页直接读写)
    pub rules: Arc<dyn RuleStore>,
}

// ============================================================
//  OpenAPI 文档定义
// ============================================================

/// 全局 OpenAPI 文档结构
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vigil 交易监察 API",
        version = "0.1.0",
        description = "Vigil 交易监察后台的 RESTful API 网关。提供数据上传、检测触发、告警复核、规则配置与合规看板功能。",
        contact(name = "Vigil Team"),
        license(name = "MIT")
    ),
    tags(
        (name = "数据 (Data)", description = "CSV 上传、检测触发与数据表管理"),
        (name = "告警 (Alerts)", description = "告警列表、复核状态迁移与聚合统计"),
        (name = "规则 (Rules)", description = "检测规则族的参数配置与开关"),
        (name = "看板 (Dashboard)", description = "合规评分与最近活动的只读投影"),
        (name = "系统 (System)", description = "健康检查")
    )
)]
pub struct ApiDoc;

// ============================================================
//  服务构建与启动
// ============================================================

/// 健康检查
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "系统 (System)",
    responses(
        (status = 200, description = "服务正常", body = ApiResponse<HealthResponse>)
    )
)]
pub async fn health() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        service: "vigil-api".to_string(),
    }))
}

/// 构建完整的 axum 应用路由树。
///
/// 与 `start_server` 分离，便于测试时绑定随机端口。
pub fn build_router(state: AppState) -> Router {
    let api_router = OpenApiRouter::new()
        .routes(routes!(health))
        .routes(routes!(data::upload_csv))
        .routes(routes!(data::run_detection))
        .routes(routes!(data::run_status))
        .routes(routes!(data::tables_info))
        .routes(routes!(data::clear_table))
        .routes(routes!(data::clear_all))
        .routes(routes!(alerts::list_alerts))
        .routes(routes!(alerts::update_alert_status))
        .routes(routes!(alerts::alert_stats))
        .routes(routes!(rules::list_rules))
        .routes(routes!(rules::get_rule))
        .routes(routes!(rules::update_rule_params))
        .routes(routes!(rules::set_rule_enabled))
        .routes(routes!(rules::reset_rules))
        .routes(routes!(dashboard::dashboard_stats))
        .routes(routes!(dashboard::compliance_score))
        .routes(routes!(dashboard::recent_activity));

    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(api_router)
        .with_state(state)
        .split_for_parts();

    // CORS: 监察控制台与 API 网关同域部署前允许所有来源
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
        .layer(cors)
}

/// 构建路由树并启动 HTTP 监听。
///
/// # Arguments
/// * `state` - 由外部 DI 容器注入的共享状态
/// * `bind_addr` - 监听的地址与端口，如 `"0.0.0.0:8000"`
pub async fn start_server(
    state: AppState,
    bind_addr: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_router(state);

    tracing::info!("🚀 Vigil API Server listening on {}", bind_addr);
    tracing::info!("📖 Swagger UI: http://{}/swagger-ui/", bind_addr);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
