// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;

/// 瞬时性HTTP状态码
///
/// 这些状态码表示临时故障，对应的请求可以安全地重试
pub const TRANSIENT_STATUS_CODES: [u16; 5] = [429, 500, 502, 503, 504];

/// 判断HTTP状态码是否为瞬时性故障
pub fn is_transient_status(status: u16) -> bool {
    TRANSIENT_STATUS_CODES.contains(&status)
}

/// 重试策略配置
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 最大尝试次数（包含首次请求）
    pub max_attempts: u32,
    /// 初始退避时间
    pub initial_backoff: Duration,
    /// 最大退避时间
    pub max_backoff: Duration,
    /// 退避乘数
    pub backoff_multiplier: f64,
    /// 抖动因子 (0.0-1.0)
    pub jitter_factor: f64,
    /// 是否启用抖动
    pub enable_jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
            enable_jitter: true,
        }
    }
}

impl RetryPolicy {
    /// 创建标准重试策略
    pub fn standard() -> Self {
        Self::default()
    }

    /// 计算下次重试的退避时间
    ///
    /// # 参数
    ///
    /// * `attempt` - 已完成的尝试次数（从1开始）
    ///
    /// # 返回值
    ///
    /// 返回下次尝试前应等待的时间
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let backoff_secs = self.initial_backoff.as_secs_f64()
            * self.backoff_multiplier.powi(attempt.saturating_sub(1) as i32);

        let capped_backoff = backoff_secs.min(self.max_backoff.as_secs_f64());

        let final_backoff = if self.enable_jitter {
            let jitter_range = capped_backoff * self.jitter_factor;
            if jitter_range > 0.0 {
                let jitter = rand::random_range(-jitter_range..jitter_range);
                (capped_backoff + jitter).max(0.0)
            } else {
                capped_backoff
            }
        } else {
            capped_backoff
        };

        Duration::from_secs_f64(final_backoff)
    }

    /// 是否允许再次尝试
    ///
    /// # 参数
    ///
    /// * `attempt` - 已完成的尝试次数
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_backoff_exponential() {
        let mut policy = RetryPolicy::standard();
        policy.enable_jitter = false;

        // 第一次重试 (attempt = 1)
        let backoff1 = policy.calculate_backoff(1);
        assert_eq!(backoff1, Duration::from_millis(500));

        // 第二次重试 (attempt = 2)
        let backoff2 = policy.calculate_backoff(2);
        assert_eq!(backoff2, Duration::from_secs(1)); // 0.5 * 2^1

        // 第三次重试 (attempt = 3)
        let backoff3 = policy.calculate_backoff(3);
        assert_eq!(backoff3, Duration::from_secs(2)); // 0.5 * 2^2
    }

    #[test]
    fn test_calculate_backoff_with_jitter() {
        let mut policy = RetryPolicy::standard();
        policy.enable_jitter = true;
        policy.jitter_factor = 0.1;

        let backoff = policy.calculate_backoff(2);
        // 应该接近 1 秒，但有 ±10% 的抖动
        let expected = Duration::from_secs(1);
        let jitter_range = Duration::from_millis(100);

        assert!(backoff >= expected - jitter_range);
        assert!(backoff <= expected + jitter_range);
    }

    #[test]
    fn test_calculate_backoff_max_limit() {
        let mut policy = RetryPolicy::standard();
        policy.max_backoff = Duration::from_secs(5);
        policy.enable_jitter = false;

        let backoff = policy.calculate_backoff(10);
        assert_eq!(backoff, Duration::from_secs(5));
    }

    #[test]
    fn test_should_retry() {
        let policy = RetryPolicy::standard();

        assert!(policy.should_retry(1));
        assert!(policy.should_retry(2));
        assert!(!policy.should_retry(3)); // max_attempts = 3
        assert!(!policy.should_retry(4));
    }

    #[test]
    fn test_transient_status_codes() {
        for status in [429, 500, 502, 503, 504] {
            assert!(is_transient_status(status));
        }
        for status in [200, 301, 400, 403, 404, 501] {
            assert!(!is_transient_status(status));
        }
    }
}
