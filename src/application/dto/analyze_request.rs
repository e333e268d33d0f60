// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

use crate::domain::models::analysis::{AnalysisStatus, CrawlStats};

/// 单域分析请求数据传输对象
#[derive(Debug, Deserialize, Serialize)]
pub struct AnalyzeRequestDto {
    /// 要分析的域，允许不带协议
    pub domain: String,
}

/// 单域分析响应数据传输对象
#[derive(Debug, Serialize)]
pub struct AnalyzeResponseDto {
    /// 输入域
    pub domain: String,
    /// 评分
    pub score: f64,
    /// 状态字符串
    pub status: AnalysisStatus,
    /// 爬取统计
    pub stats: CrawlStats,
}

/// 文本批量分析请求数据传输对象
///
/// 用于不经文件上传直接提交域列表
#[derive(Debug, Deserialize, Serialize)]
pub struct BatchTextRequestDto {
    /// 域列表
    pub domains: Vec<String>,
}

/// 任务创建响应数据传输对象
#[derive(Debug, Serialize)]
pub struct TaskCreatedDto {
    /// 后台任务标识
    pub task_id: uuid::Uuid,
}
