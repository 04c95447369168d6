//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Protected upstream call:
//!     → circuit_breaker.rs (gate check, fail fast while open)
//!     → retries.rs (attempt loop with backoff.rs delays)
//!     → upstream client (timeouts enforced by the HTTP client)
//!     → circuit_breaker.rs records the post-retry outcome in window.rs
//! ```
//!
//! # Design Decisions
//! - Composition is explicit and built once at startup (invoker.rs)
//! - Breaker sees one outcome per invocation, never individual attempts
//! - A rejected call never reaches the retry loop
//! - Callers always receive a typed `InvokeError`

pub mod backoff;
pub mod circuit_breaker;
pub mod invoker;
pub mod retries;
pub mod window;

pub use circuit_breaker::{BreakerSnapshot, BreakerState, CircuitBreaker, CircuitOpenError};
pub use invoker::{InvokeError, ResilientInvoker};
pub use retries::RetryPolicy;
