// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::ser::Serializer;
use serde::Serialize;
use std::fmt;

/// 单页提及记录
///
/// 记录一个成功抓取且提及数为正的页面
#[derive(Debug, Clone, Serialize)]
pub struct MentionRecord {
    /// 页面URL
    pub url: String,
    /// 提及次数
    pub mentions: u32,
}

/// 子页抓取失败记录
///
/// 爬取会越过此类失败继续进行
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    /// 失败的URL
    pub url: String,
    /// 错误信息
    pub error: String,
}

/// 单域爬取统计
///
/// 不变量：`total_mentions`恒等于`urls_with_mentions`中提及数之和；
/// `pages_crawled`恒等于成功访问的不同URL数量
#[derive(Debug, Clone, Default, Serialize)]
pub struct CrawlStats {
    /// 成功抓取的同域页面数（含根页面）
    pub pages_crawled: u32,
    /// 提及总数
    pub total_mentions: u32,
    /// 有提及的页面记录（爬取插入序，顺序不具意义）
    pub urls_with_mentions: Vec<MentionRecord>,
    /// 子页抓取失败记录
    pub error_urls: Vec<ErrorRecord>,
    /// 根请求发生跨主机重定向时的最终URL
    pub redirected_to: Option<String>,
}

impl CrawlStats {
    /// 记录一个成功访问的页面及其提及数
    pub fn record_page(&mut self, url: &str, mentions: u32) {
        self.pages_crawled += 1;
        self.total_mentions += mentions;
        if mentions > 0 {
            self.urls_with_mentions.push(MentionRecord {
                url: url.to_string(),
                mentions,
            });
        }
    }

    /// 记录一个抓取失败的子页
    pub fn record_error(&mut self, url: &str, error: &str) {
        self.error_urls.push(ErrorRecord {
            url: url.to_string(),
            error: error.to_string(),
        });
    }
}

/// 域分析结果分类
///
/// `Display`渲染调用方可模式匹配的精确状态字符串
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisStatus {
    /// 完整爬取成功
    Success,
    /// 成功，根请求发生了重定向
    SuccessRedirected,
    /// 子页爬取中途失败，仅主页面结果有效
    SuccessMainPageOnly,
    /// 仅主页面结果有效，且发生了重定向
    SuccessMainPageOnlyRedirected,
    /// 输入无法解析出主机
    InvalidDomainFormat,
    /// 主机不是有效的域名
    InvalidDomainName,
    /// 裸域与www域均无法连接
    ConnectionError(String),
    /// 根请求返回非2xx状态
    HttpStatus(u16),
    /// 没有任何页面被成功爬取
    NoPagesCrawled,
    /// 未预期的分析失败
    Failed(String),
}

impl AnalysisStatus {
    /// 是否为成功类状态
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            AnalysisStatus::Success
                | AnalysisStatus::SuccessRedirected
                | AnalysisStatus::SuccessMainPageOnly
                | AnalysisStatus::SuccessMainPageOnlyRedirected
        )
    }
}

impl fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisStatus::Success => write!(f, "Success"),
            AnalysisStatus::SuccessRedirected => write!(f, "Success (redirected)"),
            AnalysisStatus::SuccessMainPageOnly => write!(f, "Success (main page only)"),
            AnalysisStatus::SuccessMainPageOnlyRedirected => {
                write!(f, "Success (main page only, redirected)")
            }
            AnalysisStatus::InvalidDomainFormat => write!(f, "Error: Invalid domain format"),
            AnalysisStatus::InvalidDomainName => write!(f, "Error: Invalid domain name"),
            AnalysisStatus::ConnectionError(message) => {
                write!(f, "Error: Cannot connect to domain - {}", message)
            }
            AnalysisStatus::HttpStatus(code) => {
                write!(f, "Error: Domain returned status code {}", code)
            }
            AnalysisStatus::NoPagesCrawled => write!(f, "Error: No pages could be crawled"),
            AnalysisStatus::Failed(message) => write!(f, "Error: {}", message),
        }
    }
}

impl Serialize for AnalysisStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// 单域分析的最终输出
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    /// 有界评分，[0.0, 10.0]
    pub score: f64,
    /// 状态分类
    pub status: AnalysisStatus,
    /// 爬取统计
    pub stats: CrawlStats,
}

impl AnalysisResult {
    /// 构造一个零统计的错误结果
    pub fn error(status: AnalysisStatus) -> Self {
        Self {
            score: 0.0,
            status,
            stats: CrawlStats::default(),
        }
    }
}
