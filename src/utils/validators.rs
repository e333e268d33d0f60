// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;
use std::net::IpAddr;
use std::str::FromStr;

static DOMAIN_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    // Labels: alphanumeric with inner hyphens, max 63 chars; alphabetic TLD
    Regex::new(r"^([A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,63}$").unwrap()
});

/// 验证主机是否为有效的域名
///
/// 接受语法正确的DNS名称和IP字面量（后者用于回环测试目标）；
/// 传入的主机不应包含端口和前导`www.`
///
/// # 参数
///
/// * `host` - 主机字符串
///
/// # 返回值
///
/// 如果主机有效则返回true，否则返回false
pub fn is_valid_domain_name(host: &str) -> bool {
    if host.is_empty() {
        return false;
    }
    if IpAddr::from_str(host).is_ok() {
        return true;
    }
    DOMAIN_NAME_REGEX.is_match(host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_domains() {
        assert!(is_valid_domain_name("example.com"));
        assert!(is_valid_domain_name("sub.example.co.uk"));
        assert!(is_valid_domain_name("my-site.io"));
    }

    #[test]
    fn test_accepts_ip_literals() {
        assert!(is_valid_domain_name("127.0.0.1"));
        assert!(is_valid_domain_name("::1"));
    }

    #[test]
    fn test_rejects_invalid_names() {
        assert!(!is_valid_domain_name(""));
        assert!(!is_valid_domain_name("no-tld"));
        assert!(!is_valid_domain_name("-bad.com"));
        assert!(!is_valid_domain_name("bad-.com"));
        assert!(!is_valid_domain_name("spa ce.com"));
        assert!(!is_valid_domain_name("example.123"));
    }
}
