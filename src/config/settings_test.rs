// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::*;

#[test]
fn test_default_settings() {
    let settings = Settings::new().unwrap();

    assert_eq!(settings.server.host, "0.0.0.0");
    assert_eq!(settings.server.port, 5001);

    assert_eq!(settings.analyzer.keyword, "salesforce");
    assert_eq!(settings.analyzer.max_pages_per_domain, 20);
    assert_eq!(settings.analyzer.request_delay_secs, 1.0);
    assert_eq!(settings.analyzer.root_timeout_secs, 10);
    assert_eq!(settings.analyzer.subpage_timeout_secs, 20);
    assert!(!settings.analyzer.enforce_robots);
    assert!(settings.analyzer.user_agent.starts_with("Mozilla/5.0"));
}

#[test]
fn test_analyzer_config_conversion() {
    let settings = Settings::new().unwrap();
    let config = AnalyzerConfig::from(&settings.analyzer);

    assert_eq!(config.keyword, "salesforce");
    assert_eq!(config.max_pages_per_domain, 20);
    assert_eq!(config.request_delay, Duration::from_secs(1));
    assert_eq!(config.root_timeout, Duration::from_secs(10));
    assert_eq!(config.subpage_timeout, Duration::from_secs(20));
    assert!(!config.enforce_robots);
}
