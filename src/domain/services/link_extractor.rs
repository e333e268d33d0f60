// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::Result;
use scraper::{Html, Selector};
use std::collections::HashSet;

use crate::utils::url_utils;

/// 链接提取器
///
/// 负责从HTML内容中提取同域的爬取候选链接
pub struct LinkExtractor;

impl LinkExtractor {
    /// 从页面HTML中提取爬取候选链接
    ///
    /// 跳过空的、javascript:、纯片段、mailto:和tel:目标；
    /// 经规范化解析后丢弃跨域链接和命中路径黑名单的链接。
    /// 单个畸形链接被跳过，不会中断其余链接的提取。
    ///
    /// # 参数
    ///
    /// * `page_url` - 页面URL，用于推导基础域
    /// * `html_content` - 页面HTML内容
    ///
    /// # 返回值
    ///
    /// * `Ok(HashSet<String>)` - 去重后的链接集合（无序，遍历顺序不作保证）
    /// * `Err(anyhow::Error)` - 页面URL无法解析出基础域
    pub fn extract_links(page_url: &str, html_content: &str) -> Result<HashSet<String>> {
        let document = Html::parse_document(html_content);
        let selector =
            Selector::parse("a").map_err(|e| anyhow::anyhow!("Invalid selector: {:?}", e))?;
        let base_url = url_utils::base_of(page_url)?;
        let mut links = HashSet::new();

        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                // Ignore empty, fragment, javascript, mailto and tel targets
                if href.is_empty()
                    || href.starts_with('#')
                    || href.starts_with("javascript:")
                    || href.starts_with("mailto:")
                    || href.starts_with("tel:")
                {
                    continue;
                }

                // Absolute links must stay on the page's domain
                if href.starts_with("http") && !url_utils::is_same_domain(href, &base_url) {
                    continue;
                }

                let full_url = url_utils::resolve_candidate(&base_url, href);

                if !url_utils::is_valid_candidate(&full_url) {
                    continue;
                }

                links.insert(full_url);
            }
        }

        Ok(links)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "https://example.com/index.html";

    #[test]
    fn test_extracts_and_resolves_links() {
        let html = r#"<html><body>
            <a href="https://example.com/products">Products</a>
            <a href="/pricing/">Pricing</a>
            <a href="contact">Contact</a>
        </body></html>"#;

        let links = LinkExtractor::extract_links(PAGE, html).unwrap();
        assert_eq!(links.len(), 3);
        assert!(links.contains("https://example.com/products"));
        assert!(links.contains("https://example.com/pricing"));
        assert!(links.contains("https://example.com/contact"));
    }

    #[test]
    fn test_skips_non_http_and_fragment_targets() {
        let html = r##"<html><body>
            <a href="">Empty</a>
            <a href="#section">Fragment</a>
            <a href="javascript:void(0)">Js</a>
            <a href="mailto:sales@example.com">Mail</a>
            <a href="tel:+15551234567">Phone</a>
        </body></html>"##;

        let links = LinkExtractor::extract_links(PAGE, html).unwrap();
        assert!(links.is_empty());
    }

    #[test]
    fn test_skips_offsite_links() {
        let html = r#"<html><body>
            <a href="https://other.example.org/page">Elsewhere</a>
            <a href="https://www.example.com/kept">Kept</a>
        </body></html>"#;

        let links = LinkExtractor::extract_links(PAGE, html).unwrap();
        assert_eq!(links.len(), 1);
        assert!(links.contains("https://www.example.com/kept"));
    }

    #[test]
    fn test_skips_blacklisted_paths() {
        let html = r#"<html><body>
            <a href="/blog/post-1">Blog</a>
            <a href="/assets/brochure.pdf">Pdf</a>
            <a href="/solutions">Solutions</a>
        </body></html>"#;

        let links = LinkExtractor::extract_links(PAGE, html).unwrap();
        assert_eq!(links.len(), 1);
        assert!(links.contains("https://example.com/solutions"));
    }

    #[test]
    fn test_deduplicates_links() {
        let html = r#"<html><body>
            <a href="/pricing">One</a>
            <a href="/pricing/">Two</a>
            <a href="https://example.com/pricing">Three</a>
        </body></html>"#;

        let links = LinkExtractor::extract_links(PAGE, html).unwrap();
        assert_eq!(links.len(), 1);
    }
}
