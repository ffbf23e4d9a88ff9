//! Cachefront - An offline-first caching gateway
//!
//! Intercepts requests bound for an upstream origin, serves them from
//! partitioned response caches or the live network, and substitutes a
//! cached offline document when the network is unreachable.

mod api;
mod cache;
mod config;
mod error;
mod gateway;
mod models;
mod net;

use std::net::SocketAddr;

use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::{create_router, AppState};
use config::Config;

/// Main entry point for the caching gateway.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create storage, fetcher, and shared state
/// 4. Install: pre-cache the static asset manifest
/// 5. Activate: sweep partitions from previous deployments
/// 6. Create Axum router with the interception fallback
/// 7. Start HTTP server on configured port
/// 8. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cachefront=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Cachefront Gateway");

    // Load configuration from environment variables
    let config = Config::from_env();
    info!(
        "Configuration loaded: upstream={}, port={}, max_partition_items={}",
        config.upstream_origin, config.server_port, config.max_partition_items
    );

    // Create application state with storage and HTTP fetcher
    let state = AppState::from_config(&config)?;
    info!("Cache storage initialized");

    // Install phase: pre-cache the static manifest (individual failures
    // are logged and skipped)
    state.router.handle_install().await;

    // Activate phase: sweep partitions the current deployment does not
    // recognize, before any request is intercepted
    state.router.handle_activate().await?;

    // Create router with the interception fallback
    let app = create_router(state);

    // Bind to configured port
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Gateway listening on http://{}", addr);

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
