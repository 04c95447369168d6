//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, access log, limits, timeout)
//! - Start the scheduler alongside the listener
//! - Drain the event bus after the listener stops

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::admin;
use crate::config::GatewayConfig;
use crate::events::{BusWorkers, EventBus};
use crate::http::handlers::{concat_strings, get_move, get_moves, health};
use crate::http::middleware::access_log_middleware;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::lifecycle::{Components, Shutdown, StartupError};
use crate::resilience::ResilientInvoker;
use crate::scheduler::{MoveScheduler, SchedulerStatus};

/// How long listener queues may take to drain at shutdown.
const EVENT_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub invoker: ResilientInvoker,
    pub bus: EventBus,
    pub scheduler_status: Option<Arc<Mutex<SchedulerStatus>>>,
}

/// HTTP server for the move gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    scheduler: Option<MoveScheduler>,
    workers: BusWorkers,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn new(config: GatewayConfig) -> Result<Self, StartupError> {
        let components = Components::from_config(&config)?;

        let state = AppState {
            invoker: components.invoker,
            bus: components.bus,
            scheduler_status: components.scheduler.as_ref().map(MoveScheduler::status_handle),
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            scheduler: components.scheduler,
            workers: components.workers,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/move", get(get_moves))
            .route("/move/{id}", get(get_move))
            .route("/concat/{p1}/{p2}/{p3}/{p4}/{p5}", post(concat_strings))
            .route("/health", get(health))
            .merge(admin::admin_router())
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(TraceLayer::new_for_http())
                    .layer(middleware::from_fn(access_log_middleware))
                    .layer(propagate_request_id_layer())
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
                    .layer(DefaultBodyLimit::max(config.security.max_body_size)),
            )
    }

    /// Run the server until `shutdown` fires, then drain background work.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let scheduler_task = self.scheduler.map(|scheduler| {
            let rx = shutdown.subscribe();
            tokio::spawn(scheduler.run(rx))
        });

        let mut server_shutdown = shutdown.subscribe();
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = server_shutdown.recv().await;
            })
            .await?;
        tracing::info!("HTTP server stopped");

        if let Some(task) = scheduler_task {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Scheduler task ended abnormally");
            }
        }

        self.workers.join(EVENT_DRAIN_TIMEOUT).await;
        tracing::info!("Event listeners drained");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn router() -> Router {
        let mut config = GatewayConfig::default();
        config.scheduler.enabled = false;
        config.events.log_listener = false;
        config.upstream.use_system_proxy = false;

        let components = Components::from_config(&config).unwrap();
        let state = AppState {
            invoker: components.invoker,
            bus: components.bus,
            scheduler_status: None,
        };
        HttpServer::build_router(&config, state)
    }

    #[tokio::test]
    async fn test_layered_router_serves_health() {
        let response = router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_layered_router_rejects_bad_concat() {
        let response = router()
            .oneshot(
                Request::post("/concat/a/b/c--/d/e")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
