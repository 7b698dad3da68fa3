//! Retry policy for transient request failures.

use std::time::Duration;

use rand::Rng;

/// Exponential backoff settings applied by [`crate::Client`].
///
/// The scraping core issues each request exactly once; repeating transient
/// failures is the client's job.
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    pub max_retries: usize,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 2000,
            max_delay_ms: 30000,
        }
    }
}

impl RetryConfig {
    /// No retries at all. Used by tests against a mock server.
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Reads `STATEHOUSE_RETRY_MAX`, `STATEHOUSE_RETRY_BASE_MS` and
    /// `STATEHOUSE_RETRY_MAX_MS`, falling back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_retries: env_usize("STATEHOUSE_RETRY_MAX", defaults.max_retries),
            base_delay_ms: env_u64("STATEHOUSE_RETRY_BASE_MS", defaults.base_delay_ms),
            max_delay_ms: env_u64("STATEHOUSE_RETRY_MAX_MS", defaults.max_delay_ms),
        }
    }

    pub(crate) fn delay_for_attempt(&self, attempt: usize) -> Duration {
        let shift = (attempt.saturating_sub(1)).min(30) as u32;
        let exp = 1u64 << shift;
        let base = self
            .base_delay_ms
            .saturating_mul(exp)
            .min(self.max_delay_ms);
        let jitter = rand::thread_rng().gen_range(0.8..1.2);
        Duration::from_millis((base as f64 * jitter) as u64)
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|val| val.parse::<usize>().ok())
        .unwrap_or(default)
}
