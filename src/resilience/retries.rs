//! Retry logic.
//!
//! # Responsibilities
//! - Re-run a failed operation up to a bounded number of attempts
//! - Wait between attempts according to the configured backoff
//! - Hand the caller exactly one outcome: the first success or the last failure
//!
//! # Design Decisions
//! - Waits are `tokio::time::sleep`, so other tasks keep running
//! - Attempt state lives on the stack of one `execute` call, never shared
//! - Every failure is retried; the upstream reason is opaque at this layer

use std::future::Future;

use crate::config::RetryConfig;
use crate::observability::metrics;
use crate::resilience::backoff::Backoff;

/// Bounded retry with a delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Backoff,
}

impl RetryPolicy {
    /// `max_attempts` counts the first call; values below 1 are raised to 1.
    pub fn new(max_attempts: u32, backoff: Backoff) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_retries.saturating_add(1),
            Backoff::from_config(config),
        )
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `operation` until it succeeds or attempts are exhausted.
    pub async fn execute<F, Fut, T, E>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.max_attempts => {
                    let delay = self.backoff.delay(attempt);
                    tracing::info!(
                        attempt,
                        max_attempts = self.max_attempts,
                        delay = ?delay,
                        error = %e,
                        "Retrying upstream call"
                    );
                    metrics::record_retry();
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    tracing::warn!(attempts = attempt, error = %e, "Retries exhausted");
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use tokio::time::Instant;

    fn fixed(ms: u64) -> Backoff {
        Backoff::Fixed(Duration::from_millis(ms))
    }

    #[tokio::test(start_paused = true)]
    async fn test_fails_twice_then_succeeds() {
        let policy = RetryPolicy::new(3, fixed(500));
        let calls = AtomicU32::new(0);
        let started = Instant::now();

        let result: Result<&str, String> = policy
            .execute(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(format!("failure {}", n))
                    } else {
                        Ok("moves")
                    }
                }
            })
            .await;

        assert_eq!(result, Ok("moves"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // Two waits of 500ms between the three attempts.
        assert!(started.elapsed() >= Duration::from_millis(1000));
        assert!(started.elapsed() < Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_last_failure_when_exhausted() {
        let policy = RetryPolicy::new(4, fixed(10));
        let calls = AtomicU32::new(0);

        let result: Result<(), String> = policy
            .execute(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move { Err(format!("failure {}", n)) }
            })
            .await;

        assert_eq!(result, Err("failure 3".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_does_not_wait() {
        let policy = RetryPolicy::new(3, fixed(500));
        let started = Instant::now();

        let result: Result<u8, String> = policy.execute(|| async { Ok(1) }).await;

        assert_eq!(result, Ok(1));
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_from_config_counts_first_attempt() {
        let policy = RetryPolicy::from_config(&RetryConfig::default());
        assert_eq!(policy.max_attempts(), 4);
        assert_eq!(RetryPolicy::new(0, fixed(1)).max_attempts(), 1);
    }
}
