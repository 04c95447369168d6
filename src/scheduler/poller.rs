//! Scheduled fetch of the move catalog.
//!
//! # Responsibilities
//! - Wait for the next fire time, or for shutdown
//! - Run one protected fetch per tick, never two at once
//! - Publish successful payloads on the event bus

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::events::{Event, EventBus};
use crate::observability::metrics;
use crate::resilience::ResilientInvoker;
use crate::scheduler::cadence::Cadence;
use crate::upstream::Resource;

/// Counters and last outcome, exposed on the admin status endpoint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchedulerStatus {
    pub fired: u64,
    pub skipped: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub last_fired_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// Admits one tick at a time.
#[derive(Debug, Clone, Default)]
pub struct TickGate {
    busy: Arc<AtomicBool>,
}

impl TickGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` while a previous tick still holds its guard.
    pub fn try_enter(&self) -> Option<TickGuard> {
        if self.busy.swap(true, Ordering::AcqRel) {
            None
        } else {
            Some(TickGuard {
                busy: self.busy.clone(),
            })
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the gate when dropped.
#[derive(Debug)]
pub struct TickGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for TickGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Periodically fetches `resource` and publishes the payload.
pub struct MoveScheduler {
    invoker: ResilientInvoker,
    bus: EventBus,
    resource: Resource,
    cadence: Cadence,
    gate: TickGate,
    status: Arc<Mutex<SchedulerStatus>>,
}

impl MoveScheduler {
    pub fn new(invoker: ResilientInvoker, bus: EventBus, resource: Resource, cadence: Cadence) -> Self {
        Self {
            invoker,
            bus,
            resource,
            cadence,
            gate: TickGate::new(),
            status: Arc::new(Mutex::new(SchedulerStatus::default())),
        }
    }

    /// Shared handle to the status counters.
    pub fn status_handle(&self) -> Arc<Mutex<SchedulerStatus>> {
        self.status.clone()
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(resource = %self.resource, "Move scheduler starting");

        loop {
            let Some(delay) = self.cadence.next_delay(Utc::now()) else {
                tracing::warn!("Schedule has no upcoming fire time, scheduler exiting");
                return;
            };
            tracing::debug!(delay = ?delay, "Next scheduled fetch");

            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    self.fire();
                }
                _ = shutdown.recv() => {
                    tracing::info!("Move scheduler received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Start a tick unless one is already running. Returns whether it started.
    pub fn fire(&self) -> bool {
        let Some(guard) = self.gate.try_enter() else {
            tracing::warn!(resource = %self.resource, "Previous scheduled fetch still running, tick skipped");
            metrics::record_scheduler_tick("skipped");
            update(&self.status, |s| s.skipped += 1);
            return false;
        };

        update(&self.status, |s| {
            s.fired += 1;
            s.last_fired_at = Some(Utc::now());
        });

        let invoker = self.invoker.clone();
        let bus = self.bus.clone();
        let resource = self.resource;
        let status = self.status.clone();
        tokio::spawn(async move {
            let _guard = guard;
            match invoker.invoke(resource, None).await {
                Ok(payload) => {
                    tracing::info!(resource = %resource, bytes = payload.len(), "[SCHEDULER] Moves fetched");
                    metrics::record_scheduler_tick("success");
                    update(&status, |s| {
                        s.succeeded += 1;
                        s.last_error = None;
                    });
                    bus.publish(Event::moves_fetched(resource.to_string(), payload));
                }
                Err(e) => {
                    tracing::error!(resource = %resource, error = %e, "[SCHEDULER] Failed to fetch moves");
                    metrics::record_scheduler_tick("failure");
                    update(&status, |s| {
                        s.failed += 1;
                        s.last_error = Some(e.to_string());
                    });
                }
            }
        });
        true
    }
}

fn update(status: &Mutex<SchedulerStatus>, f: impl FnOnce(&mut SchedulerStatus)) {
    let mut guard = status.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut guard);
}
