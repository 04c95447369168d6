//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Build client, breaker, invoker, bus → Start listener
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop scheduler and accepting → Drain requests → Drain listeners → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then resilience, then bus, then listener
//! - Ordered shutdown: stop ticks and accept, drain in-flight, drain event queues
//! - Event queue drain has a timeout

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{Components, StartupError};
