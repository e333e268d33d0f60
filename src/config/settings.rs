// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

use crate::domain::services::analyzer_service::{AnalyzerConfig, DEFAULT_USER_AGENT};

/// 应用程序配置设置
///
/// 包含服务器与分析器的所有配置项
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 分析器配置
    pub analyzer: AnalyzerSettings,
}

/// 服务器配置设置
#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// 分析器配置设置
#[derive(Debug, Deserialize)]
pub struct AnalyzerSettings {
    /// 目标关键词
    pub keyword: String,
    /// 单域最大爬取页面数
    pub max_pages_per_domain: usize,
    /// 子页抓取之间的礼貌延迟（秒）
    pub request_delay_secs: f64,
    /// 根页面抓取超时（秒）
    pub root_timeout_secs: u64,
    /// 子页抓取超时（秒）
    pub subpage_timeout_secs: u64,
    /// 是否按robots.txt规则过滤候选URL
    pub enforce_robots: bool,
    /// 请求User-Agent
    pub user_agent: String,
}

impl From<&AnalyzerSettings> for AnalyzerConfig {
    fn from(settings: &AnalyzerSettings) -> Self {
        Self {
            keyword: settings.keyword.clone(),
            max_pages_per_domain: settings.max_pages_per_domain,
            request_delay: Duration::from_secs_f64(settings.request_delay_secs),
            root_timeout: Duration::from_secs(settings.root_timeout_secs),
            subpage_timeout: Duration::from_secs(settings.subpage_timeout_secs),
            enforce_robots: settings.enforce_robots,
            user_agent: settings.user_agent.clone(),
        }
    }
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从环境变量加载配置，支持默认值
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            // Start with default settings
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5001)?
            // Default analyzer settings
            .set_default("analyzer.keyword", "salesforce")?
            .set_default("analyzer.max_pages_per_domain", 20)?
            .set_default("analyzer.request_delay_secs", 1.0)?
            .set_default("analyzer.root_timeout_secs", 10)?
            .set_default("analyzer.subpage_timeout_secs", 20)?
            .set_default("analyzer.enforce_robots", false)?
            .set_default("analyzer.user_agent", DEFAULT_USER_AGENT)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("MENTIONRS").separator("__"));

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
