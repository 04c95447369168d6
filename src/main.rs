//! Move catalog gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client ──▶ http server ──▶ handlers ──▶ resilient invoker ──▶ move catalog API
//!                    │               │          (breaker → retry → client)
//!                    │               ▼                 ▲
//!                    │           event bus ◀── scheduler (cron ticks)
//!                    │               │
//!                    ▼               ▼
//!               admin/status     listeners (one worker each)
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use move_gateway::config::{load_config, validation::validate_config, GatewayConfig};
use move_gateway::lifecycle::signals::spawn_signal_handler;
use move_gateway::observability::{logging, metrics};
use move_gateway::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "move-gateway")]
#[command(about = "Resilient gateway in front of a move catalog API", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => {
            let config = GatewayConfig::default();
            if let Err(errors) = validate_config(&config) {
                let joined: Vec<String> = errors.iter().map(ToString::to_string).collect();
                return Err(format!("invalid default configuration: {}", joined.join(", ")).into());
            }
            config
        }
    };

    logging::init(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "move-gateway starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        request_timeout_secs = config.timeouts.request_secs,
        scheduler_enabled = config.scheduler.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    spawn_signal_handler(shutdown.clone());

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
