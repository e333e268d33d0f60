// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::reqwest_engine::ReqwestEngine;
use crate::engines::traits::{FetchEngine, FetchError, FetchRequest};
use crate::utils::retry_policy::RetryPolicy;
use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

const TEST_UA: &str = "mentionrs-test/1.0";

fn fast_retry_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        initial_backoff: Duration::from_millis(10),
        max_backoff: Duration::from_millis(50),
        backoff_multiplier: 2.0,
        jitter_factor: 0.0,
        enable_jitter: false,
    }
}

async fn start_test_server(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_basic_fetch() {
    let app = Router::new().route(
        "/page",
        get(|| async { "<html><body>Test content</body></html>" }),
    );
    let base = start_test_server(app).await;

    let engine = ReqwestEngine::new(TEST_UA).unwrap();
    let request = FetchRequest::new(format!("{}/page", base), Duration::from_secs(10));

    let response = engine.fetch(&request).await.unwrap();
    assert_eq!(response.status_code, 200);
    assert!(response.is_success());
    assert!(response.content.contains("Test content"));
    assert_eq!(response.final_url, format!("{}/page", base));
}

#[tokio::test]
async fn test_non_transient_status_passes_through() {
    let app = Router::new().route("/missing", get(|| async { StatusCode::NOT_FOUND }));
    let base = start_test_server(app).await;

    let engine = ReqwestEngine::with_retry_policy(TEST_UA, fast_retry_policy()).unwrap();
    let request = FetchRequest::new(format!("{}/missing", base), Duration::from_secs(10));

    let response = engine.fetch(&request).await.unwrap();
    assert_eq!(response.status_code, 404);
    assert!(!response.is_success());
}

#[tokio::test]
async fn test_transient_status_retries_then_succeeds() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new().route(
        "/flaky",
        get(move || {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    StatusCode::SERVICE_UNAVAILABLE.into_response()
                } else {
                    "recovered".into_response()
                }
            }
        }),
    );
    let base = start_test_server(app).await;

    let engine = ReqwestEngine::with_retry_policy(TEST_UA, fast_retry_policy()).unwrap();
    let request = FetchRequest::new(format!("{}/flaky", base), Duration::from_secs(10));

    let response = engine.fetch(&request).await.unwrap();
    assert_eq!(response.status_code, 200);
    assert!(response.content.contains("recovered"));
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_transient_status_exhausts_retries() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new().route(
        "/down",
        get(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { StatusCode::SERVICE_UNAVAILABLE }
        }),
    );
    let base = start_test_server(app).await;

    let engine = ReqwestEngine::with_retry_policy(TEST_UA, fast_retry_policy()).unwrap();
    let request = FetchRequest::new(format!("{}/down", base), Duration::from_secs(10));

    let err = engine.fetch(&request).await.unwrap_err();
    assert!(matches!(err, FetchError::RetriesExhausted(503)));
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_connection_error_surfaces() {
    // Bind then drop the listener so nothing accepts on the port
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let engine = ReqwestEngine::with_retry_policy(TEST_UA, fast_retry_policy()).unwrap();
    let request = FetchRequest::new(format!("http://{}/", addr), Duration::from_secs(2));

    let err = engine.fetch(&request).await.unwrap_err();
    assert!(matches!(err, FetchError::RequestFailed(_)));
}

#[tokio::test]
async fn test_redirect_reports_final_url() {
    let app = Router::new()
        .route(
            "/start",
            get(|| async {
                (
                    StatusCode::FOUND,
                    [(axum::http::header::LOCATION, "/landing")],
                )
            }),
        )
        .route("/landing", get(|| async { "landed" }));
    let base = start_test_server(app).await;

    let engine = ReqwestEngine::new(TEST_UA).unwrap();
    let request = FetchRequest::new(format!("{}/start", base), Duration::from_secs(10));

    let response = engine.fetch(&request).await.unwrap();
    assert_eq!(response.status_code, 200);
    assert_eq!(response.final_url, format!("{}/landing", base));
    assert!(response.content.contains("landed"));
}

#[tokio::test]
async fn test_engine_name() {
    let engine = ReqwestEngine::new(TEST_UA).unwrap();
    assert_eq!(engine.name(), "reqwest");
}
