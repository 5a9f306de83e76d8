//! Back-off schedule shared by the model client and the scraper.
//!
//! Both retry only HTTP 429, waiting `base × 2^attempt` (capped at 30 s)
//! scaled by a random factor in `[0.75, 1.25)`.

use std::time::Duration;

pub const MAX_DELAY_MS: u64 = 30_000;

/// Pre-jitter delay before retry number `attempt` (0-based).
#[must_use]
pub fn backoff_delay(base_delay_ms: u64, attempt: u32) -> Duration {
    let computed = base_delay_ms.saturating_mul(1u64 << attempt.min(20));
    Duration::from_millis(computed.min(MAX_DELAY_MS))
}

/// `delay` scaled by ±25 %.
#[must_use]
pub fn jittered(delay: Duration) -> Duration {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let ms = (delay.as_millis() as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
    Duration::from_millis(ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubles_from_base() {
        assert_eq!(backoff_delay(500, 0), Duration::from_millis(500));
        assert_eq!(backoff_delay(500, 1), Duration::from_millis(1000));
        assert_eq!(backoff_delay(500, 2), Duration::from_millis(2000));
    }

    #[test]
    fn capped_at_thirty_seconds() {
        assert_eq!(backoff_delay(500, 19), Duration::from_millis(MAX_DELAY_MS));
        assert_eq!(backoff_delay(20_000, 2), Duration::from_millis(MAX_DELAY_MS));
    }

    #[test]
    fn jitter_stays_within_a_quarter() {
        for _ in 0..200 {
            let ms = jittered(Duration::from_millis(1000)).as_millis();
            assert!((750..1250).contains(&ms), "{ms}");
        }
    }
}
