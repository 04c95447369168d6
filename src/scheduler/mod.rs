//! Background polling of the move catalog.
//!
//! # Data Flow
//! ```text
//! cadence.rs (next fire time from cron or fixed interval)
//!     → poller.rs tick (skipped if the previous tick is still running)
//!     → ResilientInvoker::invoke(resource)
//!     → Ok: EventBus::publish(MovesFetched), no wait on listeners
//!     → Err: logged and counted, nobody to report to
//! ```
//!
//! # Design Decisions
//! - At most one scheduled invocation in flight; overlapping ticks are dropped
//! - The poller shares the on-demand path's breaker, so a failing upstream
//!   is not hammered by background traffic either
//! - Shutdown stops new ticks; a tick already running finishes on its own

pub mod cadence;
pub mod poller;

pub use cadence::{Cadence, CronError};
pub use poller::{MoveScheduler, SchedulerStatus, TickGate, TickGuard};
