//! Retry with exponential backoff for idempotent reads.
//!
//! Only catalog reads go through here. Mutations are never retried
//! automatically: a lost response to a create could otherwise produce a
//! duplicate record.

use std::future::Future;
use std::time::Duration;

use crate::error::RemoteError;

/// Configuration for retry behavior on transient failures.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial one).
    pub max_attempts: u32,
    /// Initial delay before the first retry.
    pub base_delay: Duration,
    /// Maximum delay between retries (backoff is capped here).
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(4),
        }
    }
}

impl RetryConfig {
    /// Default delays with a custom attempt count (at least one attempt).
    #[must_use]
    pub fn with_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }
}

/// Run `op` until it succeeds, fails with a non-transient error, or the
/// attempt budget is spent.
pub async fn with_retry<T, F, Fut>(
    config: &RetryConfig,
    what: &str,
    mut op: F,
) -> Result<T, RemoteError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RemoteError>>,
{
    let mut delay = config.base_delay;
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < config.max_attempts => {
                let wait = wait_before_retry(&e, delay, config.max_delay);
                tracing::warn!(
                    what,
                    attempt,
                    max_attempts = config.max_attempts,
                    ?wait,
                    error = %e,
                    "transient failure, retrying"
                );
                tokio::time::sleep(wait).await;
                delay = std::cmp::min(delay * 2, config.max_delay);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// A rate-limited reply is honored up to `max_delay`; everything else waits
/// the current backoff.
fn wait_before_retry(error: &RemoteError, backoff: Duration, max_delay: Duration) -> Duration {
    match error {
        RemoteError::RateLimited { retry_after_secs } => {
            backoff.max(Duration::from_secs(*retry_after_secs).min(max_delay))
        }
        _ => backoff,
    }
}
