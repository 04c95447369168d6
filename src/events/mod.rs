//! In-process publish/subscribe.
//!
//! # Data Flow
//! ```text
//! Producers (concat handler, scheduler)
//!     → bus.rs EventBus::publish (enqueue, returns immediately)
//!     → one unbounded channel per listener
//!     → one worker task per listener (error and panic boundary)
//!     → listeners.rs implementations
//! ```
//!
//! # Design Decisions
//! - Subscriptions are fixed when the bus is built
//! - A listener sees events from one publisher in publication order
//! - A slow or failing listener never delays the publisher or other listeners

pub mod bus;
pub mod listeners;
pub mod types;

pub use bus::{BusWorkers, EventBus, EventBusBuilder, Listener, ListenerError};
pub use listeners::LoggingListener;
pub use types::{Event, EventKind, MovesFetched, StringsConcatenated};
