//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order
//! - Establish the backend connection
//! - Bind listeners and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners start last (traffic only when ready)

use std::net::SocketAddr;
use std::path::Path;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::backend::{BackendError, GrpcTransport, ServiceClient};
use crate::config::GatewayConfig;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::net::tls::load_tls_config;
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("backend: {0}")]
    Backend(#[from] BackendError),

    #[error("invalid address {0}")]
    Address(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Connect the backend and assemble the HTTP server.
pub async fn bootstrap(config: GatewayConfig) -> Result<HttpServer, StartupError> {
    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::Address(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr);
    }

    let transport = GrpcTransport::connect(&config.backend).await?;
    let client = ServiceClient::new(transport);

    Ok(HttpServer::new(config, client))
}

/// Bind the configured listener and serve until `shutdown` fires.
pub async fn serve(server: HttpServer, shutdown: &Shutdown) -> Result<(), StartupError> {
    let config = server.config().clone();
    let bind_address = config.listener.bind_address.clone();

    match &config.listener.tls {
        Some(tls) => {
            let addr: SocketAddr = bind_address
                .parse()
                .map_err(|_| StartupError::Address(bind_address.clone()))?;
            let rustls =
                load_tls_config(Path::new(&tls.cert_path), Path::new(&tls.key_path)).await?;
            server.run_tls(addr, rustls, shutdown.subscribe()).await?;
        }
        None => {
            let listener = TcpListener::bind(&bind_address).await?;
            tracing::info!(address = %listener.local_addr()?, "Listening for connections");
            server.run(listener, shutdown.subscribe()).await?;
        }
    }

    Ok(())
}
