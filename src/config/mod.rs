//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → resilience components built once at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; breaker and retry settings are
//!   process-lifetime constants, so there is no hot reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::BackoffMode;
pub use schema::CircuitBreakerConfig;
pub use schema::EventsConfig;
pub use schema::GatewayConfig;
pub use schema::ListenerConfig;
pub use schema::ObservabilityConfig;
pub use schema::RetryConfig;
pub use schema::SchedulerConfig;
pub use schema::UpstreamConfig;
