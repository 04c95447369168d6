//! Channel-backed event bus.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::events::types::{Event, EventKind};
use crate::observability::metrics;

/// Error reported by a listener. Logged and counted, never propagated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ListenerError(pub String);

/// Consumer of published events.
pub trait Listener: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn on_event<'a>(&'a self, event: &'a Event) -> BoxFuture<'a, Result<(), ListenerError>>;
}

#[derive(Clone)]
struct Route {
    listener: String,
    tx: mpsc::UnboundedSender<Arc<Event>>,
}

/// Collects subscriptions; [`EventBusBuilder::build`] freezes them.
#[derive(Default)]
pub struct EventBusBuilder {
    subscriptions: Vec<(Vec<EventKind>, Arc<dyn Listener>)>,
}

impl EventBusBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a listener to the given kinds. It gets one worker, so its
    /// events arrive in publication order across all of those kinds.
    pub fn subscribe<L: Listener>(mut self, kinds: &[EventKind], listener: L) -> Self {
        self.subscriptions.push((kinds.to_vec(), Arc::new(listener)));
        self
    }

    /// Subscribe a listener to every event kind.
    pub fn subscribe_all<L: Listener>(self, listener: L) -> Self {
        self.subscribe(&EventKind::ALL, listener)
    }

    /// Spawn one worker per listener and return the publishing handle.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn build(self) -> (EventBus, BusWorkers) {
        let mut routes: HashMap<EventKind, Vec<Route>> = HashMap::new();
        let mut handles = Vec::with_capacity(self.subscriptions.len());

        for (kinds, listener) in self.subscriptions {
            let (tx, rx) = mpsc::unbounded_channel();
            let route = Route {
                listener: listener.name().to_string(),
                tx,
            };
            for kind in kinds {
                routes.entry(kind).or_default().push(route.clone());
            }
            tracing::debug!(listener = listener.name(), "Event listener registered");
            handles.push(tokio::spawn(run_listener(listener, rx)));
        }

        (
            EventBus {
                routes: Arc::new(routes),
            },
            BusWorkers { handles },
        )
    }
}

/// Cloneable publishing handle.
#[derive(Clone)]
pub struct EventBus {
    routes: Arc<HashMap<EventKind, Vec<Route>>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("kinds", &self.routes.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl EventBus {
    /// A bus with no subscribers; every publish is dropped.
    pub fn disabled() -> Self {
        Self {
            routes: Arc::new(HashMap::new()),
        }
    }

    /// Enqueue `event` for every subscribed listener and return immediately.
    ///
    /// Returns the number of listeners the event was queued for.
    pub fn publish(&self, event: Event) -> usize {
        let kind = event.kind();
        metrics::record_event_published(kind.as_str());

        let Some(routes) = self.routes.get(&kind) else {
            tracing::trace!(kind = kind.as_str(), "No listeners for event");
            return 0;
        };

        let event = Arc::new(event);
        let mut queued = 0;
        for route in routes {
            match route.tx.send(event.clone()) {
                Ok(()) => queued += 1,
                Err(_) => tracing::warn!(
                    listener = %route.listener,
                    kind = kind.as_str(),
                    "Listener worker stopped, event dropped"
                ),
            }
        }
        queued
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.routes.get(&kind).map_or(0, Vec::len)
    }
}

/// Worker tasks owned by a built bus.
pub struct BusWorkers {
    handles: Vec<JoinHandle<()>>,
}

impl BusWorkers {
    /// Wait for workers to drain. Workers finish once every [`EventBus`]
    /// clone has been dropped and their queues are empty.
    pub async fn join(self, timeout: Duration) {
        let all = futures_util::future::join_all(self.handles);
        if tokio::time::timeout(timeout, all).await.is_err() {
            tracing::warn!(timeout = ?timeout, "Event listeners did not drain before timeout");
        }
    }
}

async fn run_listener(listener: Arc<dyn Listener>, mut rx: mpsc::UnboundedReceiver<Arc<Event>>) {
    while let Some(event) = rx.recv().await {
        let outcome = AssertUnwindSafe(listener.on_event(&event))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                metrics::record_listener_failure(listener.name());
                tracing::warn!(
                    listener = listener.name(),
                    event_id = %event.id(),
                    kind = event.kind().as_str(),
                    error = %e,
                    "Event listener failed"
                );
            }
            Err(_) => {
                metrics::record_listener_failure(listener.name());
                tracing::error!(
                    listener = listener.name(),
                    event_id = %event.id(),
                    kind = event.kind().as_str(),
                    "Event listener panicked"
                );
            }
        }
    }
    tracing::debug!(listener = listener.name(), "Event listener stopped");
}
