//! Delay schedules between retry attempts.

use std::time::Duration;

use rand::Rng;

use crate::config::{BackoffMode, RetryConfig};

/// How long to wait before the next attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// The same delay before every retry.
    Fixed(Duration),
    /// Doubling delay from `base`, capped at `max`, plus up to 10% jitter.
    Exponential { base: Duration, max: Duration },
}

impl Backoff {
    pub fn from_config(config: &RetryConfig) -> Self {
        match config.backoff {
            BackoffMode::Fixed => Backoff::Fixed(Duration::from_millis(config.delay_ms)),
            BackoffMode::Exponential => Backoff::Exponential {
                base: Duration::from_millis(config.delay_ms),
                max: Duration::from_millis(config.max_delay_ms),
            },
        }
    }

    /// Delay after the given failed attempt (1-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        match *self {
            Backoff::Fixed(delay) => delay,
            Backoff::Exponential { base, max } => calculate_backoff(
                attempt,
                base.as_millis() as u64,
                max.as_millis() as u64,
            ),
        }
    }

    /// Upper bound of [`Backoff::delay`] for the given attempt, jitter included.
    pub fn max_delay(&self, attempt: u32) -> Duration {
        match *self {
            Backoff::Fixed(delay) => delay,
            Backoff::Exponential { base, max } => {
                if attempt == 0 {
                    return Duration::ZERO;
                }
                let capped = (base.as_millis() as u64)
                    .saturating_mul(2u64.saturating_pow(attempt - 1))
                    .min(max.as_millis() as u64);
                Duration::from_millis(capped + capped / 10)
            }
        }
    }
}

/// Calculate exponential backoff delay with jitter.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let exponential_base = 2u64.saturating_pow(attempt - 1);
    let delay_ms = base_ms.saturating_mul(exponential_base);
    let capped_delay = delay_ms.min(max_ms);

    // Apply jitter (0 to 10% of the delay)
    let jitter_range = capped_delay / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay + jitter)
}
