// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{Extension, Json, Multipart, Path},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::application::dto::analyze_request::{BatchTextRequestDto, TaskCreatedDto};
use crate::application::use_cases::batch_analysis::{read_domains, rows_to_csv, run_batch};
use crate::domain::services::analyzer_service::DomainAnalyzer;
use crate::infrastructure::task_registry::{BatchTaskState, TaskRegistry};
use crate::presentation::errors::AppError;

/// 下载文件名
const RESULTS_FILE_NAME: &str = "analysis_results.csv";

/// 上传CSV文件并启动批量分析
///
/// multipart请求须包含一个文件字段；文件须以.csv结尾且
/// 带有`domain`列。返回可轮询的任务标识。
pub async fn upload_batch(
    Extension(analyzer): Extension<Arc<DomainAnalyzer>>,
    Extension(registry): Extension<Arc<TaskRegistry>>,
    mut multipart: Multipart,
) -> Response {
    let mut upload: Option<(String, Vec<u8>)> = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if let Some(file_name) = field.file_name().map(|name| name.to_string()) {
                    match field.bytes().await {
                        Ok(bytes) => {
                            upload = Some((file_name, bytes.to_vec()));
                            break;
                        }
                        Err(e) => {
                            return bad_request(&format!("Failed to read upload: {}", e));
                        }
                    }
                }
            }
            Ok(None) => break,
            Err(e) => return bad_request(&format!("Invalid multipart request: {}", e)),
        }
    }

    let (file_name, bytes) = match upload {
        Some(upload) => upload,
        None => return bad_request("No file provided"),
    };
    if !file_name.to_lowercase().ends_with(".csv") {
        return bad_request("Invalid file type. Please upload a CSV file");
    }

    let domains = match read_domains(bytes.as_slice()) {
        Ok(domains) => domains,
        Err(e) => return bad_request(&e.to_string()),
    };

    spawn_batch(analyzer, registry, domains).into_response()
}

/// 从JSON域列表启动批量分析
pub async fn create_batch_from_text(
    Extension(analyzer): Extension<Arc<DomainAnalyzer>>,
    Extension(registry): Extension<Arc<TaskRegistry>>,
    Json(payload): Json<BatchTextRequestDto>,
) -> Response {
    let domains: Vec<String> = payload
        .domains
        .iter()
        .map(|domain| domain.trim().to_string())
        .filter(|domain| !domain.is_empty())
        .collect();
    if domains.is_empty() {
        return bad_request("No domains provided");
    }

    spawn_batch(analyzer, registry, domains).into_response()
}

/// 查询批量分析任务状态
///
/// 完成的任务附带结果行与汇总统计
pub async fn get_batch_status(
    Extension(registry): Extension<Arc<TaskRegistry>>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let task = match registry.get(id) {
        Some(task) => task,
        None => return Ok(not_found()),
    };

    let mut response = serde_json::json!({
        "status": task.state,
        "progress": task.progress,
        "error": task.error,
    });
    if task.state == BatchTaskState::Completed {
        if let Some(report) = &task.report {
            response["results"] = serde_json::to_value(&report.rows)?;
            response["summary"] = serde_json::to_value(report.summary())?;
        }
    }

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// 下载批量分析结果CSV
pub async fn download_batch_results(
    Extension(registry): Extension<Arc<TaskRegistry>>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let task = match registry.get(id) {
        Some(task) => task,
        None => return Ok(not_found()),
    };
    if task.state != BatchTaskState::Completed {
        return Ok(bad_request("Results not ready"));
    }

    let rows = task.report.map(|report| report.rows).unwrap_or_default();
    let csv_text = rows_to_csv(&rows)?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", RESULTS_FILE_NAME),
            ),
        ],
        csv_text,
    )
        .into_response())
}

/// 注册任务并在后台运行批量分析
fn spawn_batch(
    analyzer: Arc<DomainAnalyzer>,
    registry: Arc<TaskRegistry>,
    domains: Vec<String>,
) -> (StatusCode, Json<TaskCreatedDto>) {
    let task_id = registry.create();
    info!("Starting batch analysis task {} ({} domains)", task_id, domains.len());

    tokio::spawn(async move {
        registry.mark_processing(task_id, domains.len());
        let report = run_batch(analyzer.as_ref(), &domains, |completed, total| {
            registry.update_progress(task_id, completed, total);
        })
        .await;
        registry.complete(task_id, report);
        info!("Batch analysis task {} completed", task_id);
    });

    (StatusCode::OK, Json(TaskCreatedDto { task_id }))
}

fn bad_request(message: &str) -> Response {
    error!("Bad batch request: {}", message);
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "Task not found" })),
    )
        .into_response()
}
