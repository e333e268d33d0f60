// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    routing::{get, post},
    Json, Router,
};

use crate::presentation::handlers::{analyze_handler, batch_handler};

/// 创建应用路由
///
/// # 返回值
///
/// 返回配置好的路由
pub fn routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/v1/version", get(version))
        .route("/v1/analyze", post(analyze_handler::analyze))
        .route("/v1/batch", post(batch_handler::upload_batch))
        .route("/v1/batch/text", post(batch_handler::create_batch_from_text))
        .route("/v1/batch/{id}", get(batch_handler::get_batch_status))
        .route(
            "/v1/batch/{id}/download",
            get(batch_handler::download_batch_results),
        )
}

/// 健康检查
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// 版本信息
async fn version() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "version": env!("CARGO_PKG_VERSION") }))
}

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;
