//! # `vigil-api` - HTTP API 网关
//!
//! 本 crate 是 Vigil 交易监察后台的 HTTP/REST 服务入口。
//! 使用 `axum` 构建路由与控制器，通过 `utoipa` 自动生成 OpenAPI 3.0 Swagger 文档。
//!
//! ## 架构职责
//! - 接收来自监察控制台或浏览器的 HTTP 请求
//! - 解析 CSV 上传、查询参数与 JSON 请求体为领域类型
//! - 调用下层 `DetectionManager` / `ReviewService` 完成业务操作
//! - 将领域模型转换为 DTO 返回给前端

pub mod error;
pub mod ingest;
pub mod routes;
pub mod server;
pub mod types;
