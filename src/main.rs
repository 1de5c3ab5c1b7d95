//! User-management edge gateway (v1)
//!
//! Translates the public HTTP/JSON API into unary calls on the internal
//! user-management gRPC service.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────────┐
//!                      │                    EDGE GATEWAY                       │
//!                      │                                                       │
//!   Client Request     │  ┌────────┐   ┌──────────┐   ┌──────────┐            │
//!   ───────────────────┼─▶│  http  │──▶│ pipeline │──▶│ dispatch │            │
//!                      │  │ server │   │  stages  │   │  engine  │            │
//!                      │  └────────┘   └────┬─────┘   └────┬─────┘            │
//!                      │                    │ ValidateJWT  │ one RPC          │
//!                      │                    ▼              ▼                  │
//!   Client Response    │               ┌──────────────────────────┐           │
//!   ◀──────────────────┼───────────────│  backend (tonic channel) │◀──────────┼── User
//!                      │               └──────────────────────────┘           │   Management
//!                      │                                                       │
//!                      │  config · observability · lifecycle                   │
//!                      └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use edge_gateway::config::load_config;
use edge_gateway::lifecycle::{signals, startup};
use edge_gateway::observability::logging;
use edge_gateway::Shutdown;

#[derive(Parser)]
#[command(name = "edge-gateway")]
#[command(about = "HTTP/JSON gateway for the user-management service", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    logging::init(&config.observability);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "edge-gateway starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        backend = %config.backend.user_management_url,
        request_timeout_secs = config.timeouts.request_secs,
        tls = config.listener.tls.is_some(),
        "Configuration loaded"
    );

    let server = startup::bootstrap(config).await?;

    let shutdown = Arc::new(Shutdown::new());
    signals::spawn_signal_listener(shutdown.clone());

    startup::serve(server, &shutdown).await?;

    if let Some(reason) = shutdown.reason() {
        tracing::info!(reason = %reason, "Shutdown complete");
    }
    Ok(())
}
