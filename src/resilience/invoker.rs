//! Retry and circuit breaker composed around the upstream client.

use std::sync::Arc;

use reqwest::header::HeaderValue;
use thiserror::Error;

use crate::resilience::circuit_breaker::{BreakerError, BreakerSnapshot, CircuitBreaker};
use crate::resilience::retries::RetryPolicy;
use crate::upstream::{Resource, UpstreamClient, UpstreamError};

/// Failure seen by callers of [`ResilientInvoker::invoke`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvokeError {
    /// Every attempt failed; carries the last upstream error.
    #[error("upstream failure: {0}")]
    Upstream(UpstreamError),

    /// The breaker refused the call without contacting the upstream.
    #[error("circuit breaker is open")]
    CircuitOpen,
}

impl From<BreakerError<UpstreamError>> for InvokeError {
    fn from(err: BreakerError<UpstreamError>) -> Self {
        match err {
            BreakerError::Open(_) => InvokeError::CircuitOpen,
            BreakerError::Inner(e) => InvokeError::Upstream(e),
        }
    }
}

/// Single entry point for protected upstream calls.
///
/// The breaker gates the whole retry loop, so each outcome it records already
/// reflects exhausted retries.
#[derive(Debug, Clone)]
pub struct ResilientInvoker {
    client: UpstreamClient,
    retry: RetryPolicy,
    breaker: Arc<CircuitBreaker>,
}

impl ResilientInvoker {
    pub fn new(client: UpstreamClient, retry: RetryPolicy, breaker: Arc<CircuitBreaker>) -> Self {
        Self {
            client,
            retry,
            breaker,
        }
    }

    /// Fetch a resource, forwarding `authorization` when present.
    pub async fn invoke(
        &self,
        resource: Resource,
        authorization: Option<&HeaderValue>,
    ) -> Result<String, InvokeError> {
        let result = self
            .breaker
            .call(|| {
                self.retry
                    .execute(|| self.client.call(resource, authorization))
            })
            .await;

        if let Err(e) = &result {
            tracing::error!(resource = %resource, breaker = self.breaker.name(), error = %e, "Protected upstream call failed");
        }
        result.map_err(InvokeError::from)
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    pub fn breaker_snapshot(&self) -> BreakerSnapshot {
        self.breaker.snapshot()
    }
}
