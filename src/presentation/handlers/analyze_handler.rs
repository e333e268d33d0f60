// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

use crate::application::dto::analyze_request::{AnalyzeRequestDto, AnalyzeResponseDto};
use crate::domain::services::analyzer_service::DomainAnalyzer;

/// 同步分析单个域
///
/// 请求体提供域名；任何分析故障都体现在响应的状态字符串
/// 中，处理器本身总是返回200
pub async fn analyze(
    Extension(analyzer): Extension<Arc<DomainAnalyzer>>,
    Json(payload): Json<AnalyzeRequestDto>,
) -> impl IntoResponse {
    let domain = payload.domain.trim().to_string();
    if domain.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "No domain provided" })),
        )
            .into_response();
    }

    let result = analyzer.analyze(&domain).await;
    let response = AnalyzeResponseDto {
        domain,
        score: result.score,
        status: result.status,
        stats: result.stats,
    };
    (StatusCode::OK, Json(response)).into_response()
}
