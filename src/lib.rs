//! Move catalog gateway library.

pub mod admin;
pub mod concat;
pub mod config;
pub mod events;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod scheduler;
pub mod upstream;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
