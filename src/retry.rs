use std::future::Future;
use std::time::Duration;

use rand::Rng as _;

/// Errors that know whether asking again could succeed.
pub trait Transient {
    fn is_transient(&self) -> bool;
}

/// Exponential backoff settings for per-image fetches.
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_secs: u64,
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_secs: 5,
            max_delay_secs: 60,
        }
    }
}

impl RetryConfig {
    /// Delay before retry number `retry` (0-indexed):
    /// `min(base * 2^retry, max) + jitter(0..base)`.
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let exp = 1u64.checked_shl(retry).unwrap_or(u64::MAX);
        let capped = self
            .base_delay_secs
            .saturating_mul(exp)
            .min(self.max_delay_secs);
        let jitter = match self.base_delay_secs {
            0 => 0,
            base => rand::thread_rng().gen_range(0..base),
        };
        Duration::from_secs(capped + jitter)
    }

    pub fn total_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Run `operation` until it succeeds, fails with a permanent error, or the
/// retry budget is spent. The last error is returned in the latter two cases.
pub async fn retry_transient<F, Fut, T, E>(
    config: &RetryConfig,
    what: &str,
    operation: F,
) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Transient + std::fmt::Display,
{
    let total = config.total_attempts();
    let mut attempt = 0;
    loop {
        let err = match operation().await {
            Ok(val) => return Ok(val),
            Err(e) => e,
        };
        attempt += 1;
        if !err.is_transient() || attempt >= total {
            return Err(err);
        }
        let delay = config.delay_for_retry(attempt - 1);
        tracing::warn!(
            "{} failed (attempt {}/{}), retrying in {}s: {}",
            what,
            attempt,
            total,
            delay.as_secs(),
            err
        );
        tokio::time::sleep(delay).await;
    }
}
