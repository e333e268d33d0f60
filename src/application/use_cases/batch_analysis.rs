// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::Serialize;
use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::domain::models::analysis::CrawlStats;
use crate::domain::services::analyzer_service::DomainAnalyzer;
use crate::engines::traits::FetchEngine;
use crate::utils::robots::RobotsCheckerTrait;

/// 批处理层错误类型
///
/// 仅输入层面的问题是致命的；单个域的"Error:"状态会被
/// 记录为结果行而不会中断批处理
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Input CSV must have a 'domain' column")]
    MissingDomainColumn,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// 批处理结果行
///
/// 列顺序即字段顺序：domain, score, status, pages_crawled,
/// total_mentions, redirected_to
#[derive(Debug, Clone, Serialize)]
pub struct BatchRow {
    /// 输入域
    pub domain: String,
    /// 评分
    pub score: f64,
    /// 状态字符串
    pub status: String,
    /// 成功爬取的页面数
    pub pages_crawled: u32,
    /// 提及总数
    pub total_mentions: u32,
    /// 重定向目标（如有）
    pub redirected_to: Option<String>,
}

/// 批处理汇总统计
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    /// 域总数
    pub total_domains: usize,
    /// 成功率（百分比，一位小数）
    pub success_rate: f64,
    /// 平均评分（一位小数）
    pub average_score: f64,
}

/// 批处理报告
///
/// 结果行保持输入顺序；`detailed`按域保存完整爬取统计
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// 结果行
    pub rows: Vec<BatchRow>,
    /// 每个域的完整统计
    pub detailed: HashMap<String, CrawlStats>,
}

impl BatchReport {
    /// 计算汇总统计
    pub fn summary(&self) -> BatchSummary {
        let total_domains = self.rows.len();
        if total_domains == 0 {
            return BatchSummary {
                total_domains: 0,
                success_rate: 0.0,
                average_score: 0.0,
            };
        }
        let successful = self
            .rows
            .iter()
            .filter(|row| !row.status.contains("Error"))
            .count();
        let success_rate = (successful as f64 / total_domains as f64 * 1000.0).round() / 10.0;
        let average_score = (self.rows.iter().map(|row| row.score).sum::<f64>()
            / total_domains as f64
            * 10.0)
            .round()
            / 10.0;
        BatchSummary {
            total_domains,
            success_rate,
            average_score,
        }
    }
}

/// 按顺序分析一组域
///
/// 每个域调用一次单域分析入口；每完成一个域即回调进度。
/// 域级错误状态被记录为结果行，不会中断批处理。
///
/// # 参数
///
/// * `analyzer` - 域分析器
/// * `domains` - 输入域序列
/// * `on_progress` - 进度回调，参数为（已完成数, 总数）
pub async fn run_batch<E, C, F>(
    analyzer: &DomainAnalyzer<E, C>,
    domains: &[String],
    mut on_progress: F,
) -> BatchReport
where
    E: FetchEngine,
    C: RobotsCheckerTrait,
    F: FnMut(usize, usize),
{
    let total = domains.len();
    let mut report = BatchReport::default();

    for (index, domain) in domains.iter().enumerate() {
        let result = analyzer.analyze(domain).await;
        info!(
            "Analyzed {}/{}: {} (score: {})",
            index + 1,
            total,
            domain,
            result.score
        );
        report.rows.push(BatchRow {
            domain: domain.clone(),
            score: result.score,
            status: result.status.to_string(),
            pages_crawled: result.stats.pages_crawled,
            total_mentions: result.stats.total_mentions,
            redirected_to: result.stats.redirected_to.clone(),
        });
        report.detailed.insert(domain.clone(), result.stats);
        on_progress(index + 1, total);
    }

    report
}

/// 从CSV输入读取域列表
///
/// 要求存在`domain`列；空单元格被跳过
pub fn read_domains<R: Read>(reader: R) -> Result<Vec<String>, BatchError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let domain_index = headers
        .iter()
        .position(|header| header.trim() == "domain")
        .ok_or(BatchError::MissingDomainColumn)?;

    let mut domains = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        if let Some(value) = record.get(domain_index) {
            let value = value.trim();
            if !value.is_empty() {
                domains.push(value.to_string());
            }
        }
    }
    Ok(domains)
}

/// 从CSV文件读取域列表
pub fn read_domains_from_path(path: &Path) -> Result<Vec<String>, BatchError> {
    let file = std::fs::File::open(path)?;
    read_domains(file)
}

/// 将结果行序列化为CSV文本
pub fn rows_to_csv(rows: &[BatchRow]) -> Result<String, BatchError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| BatchError::Io(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// 将结果行写入CSV文件
pub fn write_rows_csv(path: &Path, rows: &[BatchRow]) -> Result<(), BatchError> {
    let csv_text = rows_to_csv(rows)?;
    let mut file = std::fs::File::create(path)?;
    file.write_all(csv_text.as_bytes())?;
    Ok(())
}

/// 将按域的完整统计写入JSON文件
pub fn write_detailed_json(
    path: &Path,
    detailed: &HashMap<String, CrawlStats>,
) -> Result<(), BatchError> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, detailed)?;
    Ok(())
}
