//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the upstream client, breaker and retry policy from configuration
//! - Register event listeners and start their workers
//! - Prepare the scheduler (started later by the server)
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Every component is built exactly once and shared by handle

use std::sync::Arc;

use thiserror::Error;

use crate::config::GatewayConfig;
use crate::events::{BusWorkers, EventBus, EventBusBuilder, LoggingListener};
use crate::resilience::{CircuitBreaker, ResilientInvoker, RetryPolicy};
use crate::scheduler::{Cadence, CronError, MoveScheduler};
use crate::upstream::{Resource, ResourceParseError, UpstreamClient, UpstreamError};

/// Name of the breaker guarding the move catalog.
pub const MOVE_CATALOG_BREAKER: &str = "move-catalog";

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("upstream client: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("scheduler: {0}")]
    Cron(#[from] CronError),

    #[error("scheduler: {0}")]
    Resource(#[from] ResourceParseError),
}

/// Everything the server needs, built in dependency order.
pub struct Components {
    pub invoker: ResilientInvoker,
    pub bus: EventBus,
    pub workers: BusWorkers,
    pub scheduler: Option<MoveScheduler>,
}

impl Components {
    /// Must be called inside a Tokio runtime (listener workers are spawned).
    pub fn from_config(config: &GatewayConfig) -> Result<Self, StartupError> {
        let client = UpstreamClient::new(&config.upstream)?;
        let breaker = Arc::new(CircuitBreaker::new(MOVE_CATALOG_BREAKER, &config.circuit_breaker));
        let retry = RetryPolicy::from_config(&config.retries);
        let invoker = ResilientInvoker::new(client, retry, breaker);

        tracing::info!(
            upstream = %config.upstream.base_url,
            max_attempts = retry.max_attempts(),
            delay_ms = config.retries.delay_ms,
            window_size = config.circuit_breaker.window_size,
            failure_ratio = config.circuit_breaker.failure_ratio,
            open_duration_ms = config.circuit_breaker.open_duration_ms,
            "Resilient invoker ready"
        );

        let mut builder = EventBusBuilder::new();
        if config.events.log_listener {
            builder = builder.subscribe_all(LoggingListener::new(config.events.log_payload_chars));
        }
        let (bus, workers) = builder.build();

        let scheduler = if config.scheduler.enabled {
            let cadence = Cadence::cron(&config.scheduler.cron)?;
            let resource: Resource = config.scheduler.resource.parse()?;
            tracing::info!(cron = %config.scheduler.cron, resource = %resource, "Scheduler configured");
            Some(MoveScheduler::new(invoker.clone(), bus.clone(), resource, cadence))
        } else {
            tracing::info!("Scheduler disabled");
            None
        };

        Ok(Self {
            invoker,
            bus,
            workers,
            scheduler,
        })
    }
}
