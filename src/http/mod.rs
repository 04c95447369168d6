//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID) + middleware/access_log.rs
//!     → handlers.rs (move pass-through, concat)
//!     → ResilientInvoker / concat validator / EventBus
//!     → response.rs (status mapping, error bodies)
//! ```

pub mod handlers;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{request_id, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
