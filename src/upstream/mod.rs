//! Upstream move catalog access.
//!
//! # Data Flow
//! ```text
//! Resilient invoker
//!     → client.rs (one HTTP round trip, bounded by timeouts)
//!     → Ok(payload text) | Err(UpstreamError)
//! ```
//!
//! # Design Decisions
//! - No resilience logic here; retries and the breaker live in `resilience`
//! - Payloads are opaque text, never parsed
//! - Every failure kind collapses into `UpstreamError` for the layers above

pub mod client;
pub mod types;

pub use client::UpstreamClient;
pub use types::{Resource, ResourceParseError, UpstreamError};
