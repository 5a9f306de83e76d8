//! Retry utilities for scrape fetches.
//!
//! Only HTTP 429 is retried; a 404 or a parse failure will not improve by waiting.

use std::future::Future;
use std::time::Duration;

use postcraft_core::backoff::{backoff_delay, jittered};

use crate::error::ScraperError;

fn is_retriable(err: &ScraperError) -> bool {
    matches!(err, ScraperError::RateLimited { .. })
}

/// Executes `operation`, sleeping `backoff_base_ms * 2^attempt` (±25 %, capped at 30 s)
/// between retries of a 429.
///
/// With `max_retries = 3` the operation is attempted at most 4 times total.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    retry_with_sleeper(max_retries, backoff_base_ms, operation, |delay| {
        tokio::time::sleep(jittered(delay))
    })
    .await
}

/// `sleep` receives the pre-jitter delay.
async fn retry_with_sleeper<T, F, Fut, S, SFut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
    mut sleep: S,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
    S: FnMut(Duration) -> SFut,
    SFut: Future<Output = ()>,
{
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                let delay = backoff_delay(backoff_base_ms, attempt);
                #[allow(clippy::cast_possible_truncation)]
                let delay_ms = delay.as_millis() as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "scrape rate limited; retrying after backoff"
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    fn rate_limited() -> ScraperError {
        ScraperError::RateLimited {
            url: "https://example.com".to_owned(),
        }
    }

    #[tokio::test]
    async fn retries_on_rate_limited_then_succeeds() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(3, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                if cc.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(rate_limited())
                } else {
                    Ok::<u32, ScraperError>(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_not_found() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(3, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Err::<u32, ScraperError>(ScraperError::NotFound {
                    url: "https://example.com/missing".to_owned(),
                })
            }
        })
        .await;
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(ScraperError::NotFound { .. })));
    }

    #[tokio::test]
    async fn propagates_last_error_after_exhausting_retries() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(2, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Err::<u32, ScraperError>(rate_limited())
            }
        })
        .await;
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
        assert!(matches!(result, Err(ScraperError::RateLimited { .. })));
    }

    #[tokio::test]
    async fn delays_double_and_stop_at_the_cap() {
        let sleeps = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&sleeps);
        let result = retry_with_sleeper(
            3,
            20_000,
            || async { Err::<u32, ScraperError>(rate_limited()) },
            |d| {
                s.lock().unwrap().push(d);
                std::future::ready(())
            },
        )
        .await;

        assert!(matches!(result, Err(ScraperError::RateLimited { .. })));
        assert_eq!(
            *sleeps.lock().unwrap(),
            vec![
                Duration::from_millis(20_000),
                Duration::from_millis(30_000),
                Duration::from_millis(30_000),
            ]
        );
    }
}
