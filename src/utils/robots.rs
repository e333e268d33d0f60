// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use robotstxt::DefaultMatcher;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use url::Url;

use crate::utils::retry_policy::RetryPolicy;
use crate::utils::url_utils;

/// robots.txt抓取超时
const ROBOTS_FETCH_TIMEOUT: Duration = Duration::from_secs(20);

/// 规则缓存有效期
const ROBOTS_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Robots.txt检查器接口
#[async_trait]
pub trait RobotsCheckerTrait: Send + Sync {
    /// 预加载域的robots.txt规则（仅填充缓存）
    async fn preload(&self, base_url: &str) -> Result<()>;
    /// 检查URL是否被允许访问
    async fn is_allowed(&self, url_str: &str, user_agent: &str) -> Result<bool>;
}

/// 缓存的Robots.txt内容
#[derive(Clone)]
struct CachedRobots {
    /// 内容
    content: String,

    /// 过期时间
    expires_at: Instant,
}

/// Robots.txt检查器
///
/// 抓取失败时退化为空规则集（等价于"未声明任何限制"），
/// 绝不向调用方传播抓取错误
#[derive(Clone)]
pub struct RobotsChecker {
    /// HTTP客户端
    client: Client,

    /// 内存缓存
    memory_cache: Arc<Mutex<HashMap<String, CachedRobots>>>,

    /// 重试策略
    retry_policy: RetryPolicy,
}

#[async_trait]
impl RobotsCheckerTrait for RobotsChecker {
    async fn preload(&self, base_url: &str) -> Result<()> {
        let probe = format!("{}/", base_url.trim_end_matches('/'));
        self.get_robots_content(&probe).await?;
        Ok(())
    }

    async fn is_allowed(&self, url_str: &str, user_agent: &str) -> Result<bool> {
        let content = self.get_robots_content(url_str).await?;
        let mut matcher = DefaultMatcher::default();
        Ok(matcher.one_agent_allowed_by_robots(&content, user_agent, url_str))
    }
}

impl Default for RobotsChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl RobotsChecker {
    /// 创建新的Robots检查器实例
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            memory_cache: Arc::new(Mutex::new(HashMap::new())),
            retry_policy: RetryPolicy::standard(),
        }
    }

    /// 获取Robots.txt内容（带缓存）
    async fn get_robots_content(&self, url_str: &str) -> Result<String> {
        let url = Url::parse(url_str)?;
        let base = url_utils::base_of(url.as_str())?;
        let robots_url = format!("{}/robots.txt", base);

        // 1. Check memory cache
        {
            let mut cache = self.memory_cache.lock().unwrap();
            if let Some(cached) = cache.get(&robots_url) {
                if cached.expires_at > Instant::now() {
                    return Ok(cached.content.clone());
                } else {
                    cache.remove(&robots_url);
                }
            }
        }

        // 2. Fetch robots.txt with retry
        let mut attempt = 0;
        let mut content = String::new();
        let mut last_error = None;

        while attempt < self.retry_policy.max_attempts {
            attempt += 1;
            let response = self
                .client
                .get(&robots_url)
                .header("User-Agent", "mentionrs-bot/1.0")
                .timeout(ROBOTS_FETCH_TIMEOUT)
                .send()
                .await;

            match response {
                Ok(resp) => {
                    if resp.status().is_success() {
                        content = resp.text().await.unwrap_or_default();
                        last_error = None;
                        break;
                    } else if resp.status() == reqwest::StatusCode::NOT_FOUND {
                        // 404 is a valid response, meaning no robots.txt
                        content = "".to_string();
                        last_error = None;
                        break;
                    } else if resp.status().is_server_error() {
                        last_error = Some(anyhow::anyhow!("Server error: {}", resp.status()));
                    } else {
                        // Other statuses (403, etc.) degrade to an empty ruleset
                        content = "".to_string();
                        last_error = None;
                        break;
                    }
                }
                Err(e) => {
                    last_error = Some(anyhow::anyhow!("Request failed: {}", e));
                }
            }

            if attempt < self.retry_policy.max_attempts {
                let backoff = self.retry_policy.calculate_backoff(attempt);
                tokio::time::sleep(backoff).await;
            }
        }

        if let Some(err) = last_error {
            tracing::warn!("Failed to fetch robots.txt from {}: {}", robots_url, err);
            // Default to empty content on persistent error
            content = "".to_string();
        }

        // 3. Update memory cache
        {
            let mut cache = self.memory_cache.lock().unwrap();
            cache.insert(
                robots_url,
                CachedRobots {
                    content: content.clone(),
                    expires_at: Instant::now() + ROBOTS_CACHE_TTL,
                },
            );
        }

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::get, Router};
    use tokio::net::TcpListener;

    async fn serve_robots(body: &'static str) -> String {
        let app = Router::new().route("/robots.txt", get(move || async move { body }));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_disallowed_path_blocked() {
        let base = serve_robots("User-agent: *\nDisallow: /private\n").await;
        let checker = RobotsChecker::new();

        let allowed = checker
            .is_allowed(&format!("{}/private/page", base), "mentionrs-bot/1.0")
            .await
            .unwrap();
        assert!(!allowed);

        let allowed = checker
            .is_allowed(&format!("{}/public", base), "mentionrs-bot/1.0")
            .await
            .unwrap();
        assert!(allowed);
    }

    #[tokio::test]
    async fn test_missing_robots_degrades_to_allow() {
        // Server without a robots.txt route returns 404
        let app = Router::new().route("/", get(|| async { "home" }));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let checker = RobotsChecker::new();
        let allowed = checker
            .is_allowed(&format!("http://{}/anything", addr), "mentionrs-bot/1.0")
            .await
            .unwrap();
        assert!(allowed);
    }

    #[tokio::test]
    async fn test_rules_are_cached() {
        let base = serve_robots("User-agent: *\nDisallow: /x\n").await;
        let checker = RobotsChecker::new();

        checker.preload(&base).await.unwrap();
        {
            let cache = checker.memory_cache.lock().unwrap();
            assert_eq!(cache.len(), 1);
        }

        // Second lookup is served from cache
        let allowed = checker
            .is_allowed(&format!("{}/x/page", base), "mentionrs-bot/1.0")
            .await
            .unwrap();
        assert!(!allowed);
    }
}
