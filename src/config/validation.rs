//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ratios within 0..=1)
//! - Check that addresses, URLs and cron expressions parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::resilience::backoff::Backoff;
use crate::scheduler::cadence::Cadence;
use crate::upstream::Resource;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("upstream.base_url: {0}")]
    InvalidUpstreamUrl(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("circuit_breaker.failure_ratio must be within (0.0, 1.0], got {0}")]
    FailureRatio(String),

    #[error("circuit_breaker.minimum_calls ({minimum}) exceeds window_size ({window})")]
    MinimumExceedsWindow { minimum: usize, window: usize },

    #[error(
        "timeouts.request_secs ({inbound_ms} ms) is shorter than the worst-case upstream retry chain ({chain_ms} ms)"
    )]
    InboundTimeoutTooShort { inbound_ms: u64, chain_ms: u64 },

    #[error("scheduler.cron: {0}")]
    Cron(String),

    #[error("scheduler.resource: {0}")]
    Resource(String),
}

/// Validate a parsed configuration, collecting every error found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    match url::Url::parse(&config.upstream.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::InvalidUpstreamUrl(format!(
            "unsupported scheme '{}'",
            url.scheme()
        ))),
        Err(e) => errors.push(ValidationError::InvalidUpstreamUrl(e.to_string())),
    }

    if config.upstream.connect_timeout_ms == 0 {
        errors.push(ValidationError::Zero("upstream.connect_timeout_ms"));
    }
    if config.upstream.request_timeout_ms == 0 {
        errors.push(ValidationError::Zero("upstream.request_timeout_ms"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }

    if config.timeouts.request_secs > 0 {
        let inbound_ms = config.timeouts.request_secs.saturating_mul(1_000);
        let chain_ms = retry_chain_ms(config);
        if inbound_ms < chain_ms {
            errors.push(ValidationError::InboundTimeoutTooShort {
                inbound_ms,
                chain_ms,
            });
        }
    }

    let breaker = &config.circuit_breaker;
    if breaker.window_size == 0 {
        errors.push(ValidationError::Zero("circuit_breaker.window_size"));
    }
    if breaker.minimum_calls == 0 {
        errors.push(ValidationError::Zero("circuit_breaker.minimum_calls"));
    }
    if breaker.minimum_calls > breaker.window_size {
        errors.push(ValidationError::MinimumExceedsWindow {
            minimum: breaker.minimum_calls,
            window: breaker.window_size,
        });
    }
    if !(breaker.failure_ratio > 0.0 && breaker.failure_ratio <= 1.0) {
        errors.push(ValidationError::FailureRatio(breaker.failure_ratio.to_string()));
    }
    if breaker.open_duration_ms == 0 {
        errors.push(ValidationError::Zero("circuit_breaker.open_duration_ms"));
    }

    if let Err(e) = Cadence::cron(&config.scheduler.cron) {
        errors.push(ValidationError::Cron(e.to_string()));
    }
    if let Err(e) = config.scheduler.resource.parse::<Resource>() {
        errors.push(ValidationError::Resource(e.to_string()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Longest time one protected upstream call can take: every attempt times
/// out and every wait is at its upper bound.
pub fn retry_chain_ms(config: &GatewayConfig) -> u64 {
    let retries = &config.retries;
    let backoff = Backoff::from_config(retries);
    let attempts = u64::from(retries.max_retries) + 1;
    let waits: u64 = (1..=retries.max_retries)
        .map(|attempt| backoff.max_delay(attempt).as_millis() as u64)
        .fold(0, u64::saturating_add);
    attempts
        .saturating_mul(config.upstream.request_timeout_ms)
        .saturating_add(waits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&GatewayConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.upstream.base_url = "ftp://catalog".into();
        config.circuit_breaker.failure_ratio = 1.5;
        config.circuit_breaker.minimum_calls = 8;
        config.scheduler.cron = "every five minutes".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::MinimumExceedsWindow { minimum: 8, window: 4 })));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::Cron(_))));
    }

    #[test]
    fn test_rejects_unknown_resource() {
        let mut config = GatewayConfig::default();
        config.scheduler.resource = "ability/7".into();

        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors.as_slice(), [ValidationError::Resource(_)]));
    }

    #[test]
    fn test_default_retry_chain_fits_inbound_timeout() {
        let config = GatewayConfig::default();
        // 4 attempts of 5 s plus 3 waits of 500 ms
        assert_eq!(retry_chain_ms(&config), 21_500);
    }

    #[test]
    fn test_rejects_inbound_timeout_shorter_than_retry_chain() {
        let mut config = GatewayConfig::default();
        config.timeouts.request_secs = 10;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::InboundTimeoutTooShort {
                inbound_ms: 10_000,
                chain_ms: 21_500,
            }]
        );
    }
}
