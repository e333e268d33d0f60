// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::{FetchEngine, FetchError, FetchRequest, FetchResponse};
use crate::utils::retry_policy::{is_transient_status, RetryPolicy};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Instant;
use tracing::debug;

/// 抓取引擎
///
/// 基于reqwest实现的HTTP抓取引擎，持有一个池化的客户端，
/// 对连接类故障和瞬时状态码（429/500/502/503/504）透明重试。
/// 仅发送GET请求，所有重定向均自动跟随。
pub struct ReqwestEngine {
    /// 共享的HTTP客户端
    client: Client,
    /// 重试策略
    retry_policy: RetryPolicy,
}

impl ReqwestEngine {
    /// 创建新的抓取引擎实例
    ///
    /// # 参数
    ///
    /// * `user_agent` - 所有请求携带的固定User-Agent
    ///
    /// # 返回值
    ///
    /// * `Ok(ReqwestEngine)` - 新的引擎实例
    /// * `Err(FetchError)` - 客户端构建失败
    pub fn new(user_agent: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .cookie_store(true)
            .build()?;
        Ok(Self {
            client,
            retry_policy: RetryPolicy::standard(),
        })
    }

    /// 使用自定义重试策略创建引擎实例
    pub fn with_retry_policy(user_agent: &str, retry_policy: RetryPolicy) -> Result<Self, FetchError> {
        let mut engine = Self::new(user_agent)?;
        engine.retry_policy = retry_policy;
        Ok(engine)
    }
}

#[async_trait]
impl FetchEngine for ReqwestEngine {
    /// 执行HTTP抓取
    ///
    /// # 参数
    ///
    /// * `request` - 抓取请求
    ///
    /// # 返回值
    ///
    /// * `Ok(FetchResponse)` - 抓取响应（含非2xx状态）
    /// * `Err(FetchError)` - 连接类故障，或瞬时状态码重试耗尽
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, FetchError> {
        let start = Instant::now();
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let result = self
                .client
                .get(&request.url)
                .timeout(request.timeout)
                .send()
                .await;

            match result {
                Ok(response) => {
                    let status = response.status().as_u16();
                    if is_transient_status(status) {
                        if self.retry_policy.should_retry(attempt) {
                            let backoff = self.retry_policy.calculate_backoff(attempt);
                            debug!(
                                "Transient status {} from {}, retrying in {:?}",
                                status, request.url, backoff
                            );
                            tokio::time::sleep(backoff).await;
                            continue;
                        }
                        return Err(FetchError::RetriesExhausted(status));
                    }

                    let final_url = response.url().to_string();
                    let content = response.text().await?;

                    return Ok(FetchResponse {
                        final_url,
                        status_code: status,
                        content,
                        response_time_ms: start.elapsed().as_millis() as u64,
                    });
                }
                Err(e) => {
                    let err = FetchError::from(e);
                    if err.is_retryable() && self.retry_policy.should_retry(attempt) {
                        let backoff = self.retry_policy.calculate_backoff(attempt);
                        debug!(
                            "Request to {} failed ({}), retrying in {:?}",
                            request.url, err, backoff
                        );
                        tokio::time::sleep(backoff).await;
                        continue;
                    }
                    return Err(err);
                }
            }
        }
    }

    /// 获取引擎名称
    fn name(&self) -> &'static str {
        "reqwest"
    }
}

#[cfg(test)]
#[path = "reqwest_engine_test.rs"]
mod tests;
