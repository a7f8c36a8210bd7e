use std::future::Future;
use std::time::Duration;

use crate::config::OrderingConfig;
use crate::ordering::OrderError;

/// Bounded retry for transient storage failures on ordering writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Linear backoff: attempt `n` waits `n * backoff`.
    fn delay(&self, attempt: u32) -> Duration {
        self.backoff * attempt
    }
}

impl From<&OrderingConfig> for RetryPolicy {
    fn from(config: &OrderingConfig) -> Self {
        Self {
            max_retries: config.max_storage_retries,
            backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }
}

/// Run `op` until it succeeds, fails permanently, or the policy is exhausted.
///
/// Each attempt runs in its own transaction, so a failed attempt has left
/// nothing behind when the next one starts.
pub async fn with_storage_retry<T, F, Fut>(
    policy: RetryPolicy,
    mut op: F,
) -> Result<T, OrderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, OrderError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Err(err) if err.is_retryable() && attempt < policy.max_retries => {
                attempt += 1;
                tracing::warn!(
                    attempt,
                    max = policy.max_retries,
                    "retrying ordering write: {}",
                    err
                );
                tokio::time::sleep(policy.delay(attempt)).await;
            }
            result => return result,
        }
    }
}
