//! IPAM API Server
//!
//! Hosts the `ipam` resource extension over HTTP:
//! - Registers the ipam descriptor with the in-memory backend
//! - Freezes the routing table before serving
//! - Serves `/ipams` under the configured API prefix
//!
//! Configuration is read from environment variables (see `config`).

mod config;
mod error;

use crate::config::Config;
use crate::error::ServerError;
use axum::Router;
use ipam_extension::InMemoryIpamPlugin;
use resource_api::ExtensionRegistry;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting IPAM API server");

    let config = Config::from_env()?;
    info!("Configuration:");
    info!("  Bind address: {}", config.bind_address);
    info!("  Path prefix: {}", config.path_prefix.as_deref().unwrap_or("(none)"));

    let mut registry = ExtensionRegistry::new();
    ipam_extension::register(&mut registry, Arc::new(InMemoryIpamPlugin::new()))?;
    let resources = registry.freeze()?;

    let app = match &config.path_prefix {
        Some(prefix) => Router::new().nest(prefix, resources),
        None => resources,
    }
    .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("IPAM API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
