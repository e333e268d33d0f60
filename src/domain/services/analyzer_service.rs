// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::Result;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::domain::models::analysis::{AnalysisResult, AnalysisStatus, CrawlStats};
use crate::domain::services::link_extractor::LinkExtractor;
use crate::domain::services::mention_scorer::{MentionScorer, MAX_SCORE};
use crate::engines::reqwest_engine::ReqwestEngine;
use crate::engines::traits::{FetchEngine, FetchRequest};
use crate::utils::robots::{RobotsChecker, RobotsCheckerTrait};
use crate::utils::{url_utils, validators};

/// 默认请求身份
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.114 Safari/537.36";

/// 分析器配置
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// 目标关键词
    pub keyword: String,
    /// 单域最大爬取页面数
    pub max_pages_per_domain: usize,
    /// 子页抓取之间的礼貌延迟
    pub request_delay: Duration,
    /// 根页面抓取超时
    pub root_timeout: Duration,
    /// 子页抓取超时
    pub subpage_timeout: Duration,
    /// 是否按robots.txt规则过滤候选URL
    pub enforce_robots: bool,
    /// 请求User-Agent
    pub user_agent: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            keyword: "salesforce".to_string(),
            max_pages_per_domain: 20,
            request_delay: Duration::from_secs(1),
            root_timeout: Duration::from_secs(10),
            subpage_timeout: Duration::from_secs(20),
            enforce_robots: false,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// 单次分析的瞬态状态
///
/// 由创建它的那次`analyze`调用独占，结果返回后即被丢弃；
/// 不同域的分析之间不共享任何可变状态
struct CrawlSession {
    /// 已访问URL集合
    visited: HashSet<String>,
    /// 爬取边界：已发现、未访问的同域候选URL（无序工作集）
    frontier: HashSet<String>,
    /// 累积统计
    stats: CrawlStats,
}

impl CrawlSession {
    fn new() -> Self {
        Self {
            visited: HashSet::new(),
            frontier: HashSet::new(),
            stats: CrawlStats::default(),
        }
    }

    /// 从边界中取出任意一个URL
    ///
    /// 遍历顺序有意不作保证
    fn pop_frontier(&mut self) -> Option<String> {
        let next = self.frontier.iter().next().cloned()?;
        self.frontier.take(&next)
    }
}

/// 域分析器
///
/// 驱动单域的受限爬取与评分：校验输入域、带`www.`回退地
/// 抓取根页面、检测重定向、从根页面链接播种边界、在页面
/// 上限与评分上限内遍历同域子页，并对中途故障做部分结果
/// 恢复。`analyze`在签名层面不会失败——所有故障都被归类
/// 到状态字符串中。
pub struct DomainAnalyzer<E: FetchEngine = ReqwestEngine, C: RobotsCheckerTrait = RobotsChecker> {
    /// 抓取引擎
    engine: Arc<E>,
    /// Robots.txt检查器
    robots: C,
    /// 提及计数与评分器
    scorer: MentionScorer,
    /// 配置
    config: AnalyzerConfig,
}

impl DomainAnalyzer {
    /// 创建新的域分析器实例
    ///
    /// # 参数
    ///
    /// * `config` - 分析器配置
    ///
    /// # 返回值
    ///
    /// * `Ok(DomainAnalyzer)` - 新的分析器实例
    /// * `Err(anyhow::Error)` - HTTP客户端构建失败
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        let engine = Arc::new(ReqwestEngine::new(&config.user_agent)?);
        Ok(Self::with_components(engine, RobotsChecker::new(), config))
    }
}

impl<E: FetchEngine, C: RobotsCheckerTrait> DomainAnalyzer<E, C> {
    /// 使用自定义引擎与Robots检查器创建分析器实例
    pub fn with_components(engine: Arc<E>, robots: C, config: AnalyzerConfig) -> Self {
        let scorer = MentionScorer::new(&config.keyword);
        Self {
            engine,
            robots,
            scorer,
            config,
        }
    }

    /// 分析单个域
    ///
    /// # 参数
    ///
    /// * `domain` - 输入域，允许不带协议
    ///
    /// # 返回值
    ///
    /// 返回评分、状态分类与爬取统计；任何未被分类的故障都
    /// 会在此处被转换为通用错误结果，绝不向调用方抛出
    pub async fn analyze(&self, domain: &str) -> AnalysisResult {
        match self.try_analyze(domain).await {
            Ok(result) => result,
            Err(e) => {
                error!("Error analyzing {}: {}", domain, e);
                AnalysisResult::error(AnalysisStatus::Failed(e.to_string()))
            }
        }
    }

    async fn try_analyze(&self, domain: &str) -> Result<AnalysisResult> {
        // VALIDATE: default to https for schemeless input
        let input = if domain.starts_with("http://") || domain.starts_with("https://") {
            domain.to_string()
        } else {
            format!("https://{}", domain)
        };

        let parsed = match Url::parse(&input) {
            Ok(url) => url,
            Err(_) => return Ok(AnalysisResult::error(AnalysisStatus::InvalidDomainFormat)),
        };
        let host = match parsed.host_str() {
            Some(host) if !host.is_empty() => host.to_string(),
            _ => return Ok(AnalysisResult::error(AnalysisStatus::InvalidDomainFormat)),
        };

        let bare_host = host.strip_prefix("www.").unwrap_or(&host).to_string();
        if !validators::is_valid_domain_name(&bare_host) {
            return Ok(AnalysisResult::error(AnalysisStatus::InvalidDomainName));
        }

        let scheme = parsed.scheme().to_string();
        let authority = match parsed.port() {
            Some(port) => format!("{}:{}", bare_host, port),
            None => bare_host,
        };
        let mut working_domain = format!("{}://{}", scheme, authority);
        info!("Starting analysis of {}", working_domain);

        // FETCH_ROOT: bare host first, then the www-prefixed fallback
        let root_request = FetchRequest::new(working_domain.clone(), self.config.root_timeout);
        let root = match self.engine.fetch(&root_request).await {
            Ok(response) => response,
            Err(first_error) => {
                debug!(
                    "Root fetch of {} failed ({}), retrying with www prefix",
                    working_domain, first_error
                );
                working_domain = format!("{}://www.{}", scheme, authority);
                let www_request =
                    FetchRequest::new(working_domain.clone(), self.config.root_timeout);
                match self.engine.fetch(&www_request).await {
                    Ok(response) => response,
                    Err(second_error) => {
                        warn!("Cannot connect to {}: {}", working_domain, second_error);
                        let message = second_error.to_string();
                        let mut stats = CrawlStats::default();
                        stats.record_error(&working_domain, &message);
                        return Ok(AnalysisResult {
                            score: 0.0,
                            status: AnalysisStatus::ConnectionError(message),
                            stats,
                        });
                    }
                }
            }
        };

        if !root.is_success() {
            return Ok(AnalysisResult::error(AnalysisStatus::HttpStatus(
                root.status_code,
            )));
        }

        // Redirect detection: adopt the final host as the working domain
        let final_url = root.final_url.trim_end_matches('/').to_string();
        let redirected = !url_utils::is_same_domain(&final_url, &working_domain);
        if redirected {
            info!("Domain {} redirected to {}", working_domain, final_url);
            working_domain = url_utils::base_of(&final_url)?;
        }

        let mut session = CrawlSession::new();
        if redirected {
            session.stats.redirected_to = Some(final_url.clone());
        }

        // SCORE_ROOT
        session.visited.insert(final_url.clone());
        let root_mentions = self.scorer.count_mentions(&root.content);
        session.stats.record_page(&final_url, root_mentions);
        let mut score = self.scorer.score_of(session.stats.total_mentions);

        if score >= MAX_SCORE {
            info!("Reached maximum score for {}", working_domain);
            let status = if redirected {
                AnalysisStatus::SuccessRedirected
            } else {
                AnalysisStatus::Success
            };
            return Ok(AnalysisResult {
                score,
                status,
                stats: session.stats,
            });
        }

        // Populate robots rules; they gate candidates only when enforcement is on
        if let Err(e) = self.robots.preload(&working_domain).await {
            debug!("robots.txt preload for {} failed: {}", working_domain, e);
        }

        // CRAWL_SUBPAGES, degrading to the main-page result on unexpected failure
        match self
            .crawl_subpages(&mut session, &working_domain, &final_url, &root.content)
            .await
        {
            Ok(final_score) => score = final_score,
            Err(e) => {
                if session.stats.total_mentions > 0 {
                    warn!("Error processing subpages for {}: {}", working_domain, e);
                    // Keep the score earned from everything fetched before the failure
                    score = self.scorer.score_of(session.stats.total_mentions);
                    let status = if redirected {
                        AnalysisStatus::SuccessMainPageOnlyRedirected
                    } else {
                        AnalysisStatus::SuccessMainPageOnly
                    };
                    return Ok(AnalysisResult {
                        score,
                        status,
                        stats: session.stats,
                    });
                }
                return Err(e);
            }
        }

        let (score, status) = if session.stats.pages_crawled == 0 {
            (0.0, AnalysisStatus::NoPagesCrawled)
        } else if redirected {
            (score, AnalysisStatus::SuccessRedirected)
        } else {
            (score, AnalysisStatus::Success)
        };
        info!("Completed analysis of {} (score: {})", working_domain, score);
        Ok(AnalysisResult {
            score,
            status,
            stats: session.stats,
        })
    }

    /// 驱动有界的子页爬取循环
    ///
    /// 终止条件：边界耗尽、达到页面上限或达到评分上限。
    /// 单个子页的抓取失败被记录后跳过；此处返回的错误属于
    /// 未预期故障，由调用方决定是否降级为仅主页面结果。
    async fn crawl_subpages(
        &self,
        session: &mut CrawlSession,
        working_domain: &str,
        root_url: &str,
        root_html: &str,
    ) -> Result<f64> {
        session.frontier = LinkExtractor::extract_links(root_url, root_html)?;
        let mut score = self.scorer.score_of(session.stats.total_mentions);

        while session.visited.len() < self.config.max_pages_per_domain && score < MAX_SCORE {
            let url = match session.pop_frontier() {
                Some(url) => url,
                None => break,
            };
            if session.visited.contains(&url) {
                continue;
            }

            if self.config.enforce_robots
                && !self.robots.is_allowed(&url, &self.config.user_agent).await?
            {
                debug!("Skipping {} (disallowed by robots.txt)", url);
                continue;
            }

            let request = FetchRequest::new(url.clone(), self.config.subpage_timeout);
            let response = match self.engine.fetch(&request).await {
                Ok(response) => response,
                Err(e) => {
                    warn!("Error fetching {}: {}", url, e);
                    session.stats.record_error(&url, &e.to_string());
                    continue;
                }
            };
            if !response.is_success() {
                warn!("Error fetching {}: status {}", url, response.status_code);
                session
                    .stats
                    .record_error(&url, &format!("HTTP status {}", response.status_code));
                continue;
            }

            // Skip pages that resolved onto a different domain
            if !url_utils::is_same_domain(&response.final_url, working_domain) {
                continue;
            }

            session.visited.insert(response.final_url.clone());
            let mentions = self.scorer.count_mentions(&response.content);
            session.stats.record_page(&response.final_url, mentions);
            score = self.scorer.score_of(session.stats.total_mentions);

            if score >= MAX_SCORE {
                info!("Reached maximum score for {}", working_domain);
                break;
            }

            debug!("Successfully processed {} ({} mentions)", url, mentions);
            tokio::time::sleep(self.config.request_delay).await;
        }

        Ok(score)
    }
}

#[cfg(test)]
#[path = "analyzer_service_test.rs"]
mod tests;
