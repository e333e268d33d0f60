// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use clap::Parser;
use mentionrs::application::use_cases::batch_analysis;
use mentionrs::config::settings::Settings;
use mentionrs::domain::services::analyzer_service::{AnalyzerConfig, DomainAnalyzer};
use mentionrs::utils::telemetry;
use std::path::PathBuf;
use tracing::info;

/// 批量域分析命令行工具
///
/// 读取带`domain`列的CSV，逐域分析并写出结果表；
/// 可选地输出按域的完整统计JSON
#[derive(Parser, Debug)]
#[command(name = "mentionrs-batch", version, about = "Analyze websites for keyword mentions")]
struct Args {
    /// 输入CSV文件路径
    #[arg(long)]
    input: PathBuf,

    /// 输出CSV文件路径
    #[arg(long)]
    output: PathBuf,

    /// 详细JSON输出路径（可选）
    #[arg(long)]
    detailed_output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_telemetry();
    let args = Args::parse();

    let settings = Settings::new()?;
    let analyzer = DomainAnalyzer::new(AnalyzerConfig::from(&settings.analyzer))?;

    let domains = batch_analysis::read_domains_from_path(&args.input)?;
    info!("Analyzing {} domains from {}", domains.len(), args.input.display());

    let total = domains.len();
    let report = batch_analysis::run_batch(&analyzer, &domains, |completed, _| {
        info!("Progress: {}/{}", completed, total);
    })
    .await;

    batch_analysis::write_rows_csv(&args.output, &report.rows)?;
    info!("Results saved to {}", args.output.display());

    if let Some(detailed_path) = &args.detailed_output {
        batch_analysis::write_detailed_json(detailed_path, &report.detailed)?;
        info!("Detailed results saved to {}", detailed_path.display());
    }

    Ok(())
}
