//! Retry with exponential back-off and jitter for model API calls.
//!
//! Only HTTP 429 is retried. Every other failure (4xx, 5xx, transport,
//! malformed body) aborts the call immediately.

use std::future::Future;
use std::time::Duration;

use postcraft_core::backoff::jittered;
pub use postcraft_core::backoff::backoff_delay;

use crate::error::LlmError;

/// How many times to retry a rate-limited call and how long to wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    /// Scale each delay by a random factor in `[0.75, 1.25)`.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 500,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay_ms: 0,
            jitter: false,
        }
    }
}

pub(crate) fn is_retriable(err: &LlmError) -> bool {
    matches!(err, LlmError::RateLimited)
}

/// Runs `operation`, retrying on [`LlmError::RateLimited`] per `policy`.
///
/// With the default policy the schedule is 500 ms, 1 000 ms, 2 000 ms (±25 %),
/// so a call is attempted at most four times.
///
/// # Errors
///
/// Returns the first non-retriable error, or the last `RateLimited` once
/// retries are exhausted.
pub async fn retry_with_backoff<T, F, Fut>(policy: RetryPolicy, operation: F) -> Result<T, LlmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
{
    retry_with_sleeper(policy, operation, tokio::time::sleep).await
}

async fn retry_with_sleeper<T, F, Fut, S, SFut>(
    policy: RetryPolicy,
    mut operation: F,
    mut sleep: S,
) -> Result<T, LlmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
    S: FnMut(Duration) -> SFut,
    SFut: Future<Output = ()>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= policy.max_retries {
                    return Err(err);
                }
                let base = backoff_delay(policy.base_delay_ms, attempt);
                let delay = if policy.jitter { jittered(base) } else { base };
                #[allow(clippy::cast_possible_truncation)]
                let delay_ms = delay.as_millis() as u64;
                tracing::warn!(
                    attempt = attempt + 1,
                    max_retries = policy.max_retries,
                    delay_ms,
                    "model API rate limited; retrying after back-off"
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
