// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::{ParseError, Url};

/// 非内容路径模式黑名单
///
/// 路径中（不区分大小写）包含任一模式的URL不会被加入爬取边界
const EXCLUDED_PATH_PATTERNS: [&str; 17] = [
    "/blog/", "/article", "/thread", "/news/", "/press/", "/post", ".pdf", ".jpg", ".jpeg",
    ".png", ".gif", ".doc", ".docx", "/category/", "/tag/", "/author/", "/archive/",
];

/// 提取URL的基础部分（scheme://host[:port]）
///
/// 丢弃路径、查询参数和片段
///
/// # 参数
///
/// * `url` - 完整URL字符串
///
/// # 返回值
///
/// * `Ok(String)` - 基础URL
/// * `Err(ParseError)` - URL无法解析或没有主机部分
pub fn base_of(url: &str) -> Result<String, ParseError> {
    let parsed = Url::parse(url)?;
    let host = parsed.host_str().ok_or(ParseError::EmptyHost)?;
    Ok(match parsed.port() {
        Some(port) => format!("{}://{}:{}", parsed.scheme(), host, port),
        None => format!("{}://{}", parsed.scheme(), host),
    })
}

/// 规范化主机用于同域比较
///
/// 小写主机名并去除前导`www.`，保留端口；协议被忽略
fn host_key(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    Some(match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

/// 判断两个URL是否属于同一域
///
/// 比较去除前导`www.`后的主机（含端口），忽略协议
pub fn is_same_domain(a: &str, b: &str) -> bool {
    match (host_key(a), host_key(b)) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

/// 判断URL是否为有效的爬取候选
///
/// 语法无效的URL或路径命中黑名单模式的URL（博客、文章、
/// 新闻、分类页以及二进制/文档文件）会被拒绝
pub fn is_valid_candidate(url: &str) -> bool {
    let parsed = match Url::parse(url) {
        Ok(u) => u,
        Err(_) => return false,
    };
    if parsed.host_str().is_none() {
        return false;
    }

    let path = parsed.path().to_lowercase();
    !EXCLUDED_PATH_PATTERNS
        .iter()
        .any(|pattern| path.contains(pattern))
}

/// 将锚点href解析为规范化的绝对URL
///
/// 绝对href原样使用；相对href去除首尾斜杠后拼接到
/// 基础URL（scheme://host）之上
///
/// # 参数
///
/// * `base` - 页面的基础URL（scheme://host形式）
/// * `href` - 锚点的href属性值
pub fn resolve_candidate(base: &str, href: &str) -> String {
    if href.starts_with("http") {
        return href.to_string();
    }
    let trimmed = href.trim_matches('/');
    if trimmed.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, trimmed)
    }
}
