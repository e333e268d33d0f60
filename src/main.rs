// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::Extension;
use mentionrs::config::settings::Settings;
use mentionrs::domain::services::analyzer_service::{AnalyzerConfig, DomainAnalyzer};
use mentionrs::infrastructure::task_registry::TaskRegistry;
use mentionrs::presentation::routes;
use mentionrs::utils::telemetry;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting mentionrs...");

    // 2. Load configuration
    let settings = Arc::new(Settings::new()?);
    info!("Configuration loaded");

    // 3. Initialize the domain analyzer
    let analyzer_config = AnalyzerConfig::from(&settings.analyzer);
    let analyzer = Arc::new(DomainAnalyzer::new(analyzer_config)?);
    info!("Domain analyzer initialized");

    // 4. Initialize the batch task registry
    let registry = Arc::new(TaskRegistry::new());

    // 5. Build the router
    let app = routes::routes()
        .layer(Extension(analyzer))
        .layer(Extension(registry))
        .layer(Extension(settings.clone()))
        .layer(TraceLayer::new_for_http());

    // 6. Start the server
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
