//! Paynotify Web Server - Midtrans notification receiver.
//!
//! This binary:
//! - Loads the server key and store settings from the environment
//! - Opens the order store (SQLite when `DATABASE_URL` is set, memory otherwise)
//! - Serves the notification endpoint until SIGINT/SIGTERM

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use paynotify::web::router;
use paynotify::{
    AppState, Config, MemoryOrderStore, OrderReconciler, OrderStore, SignatureVerifier,
    SqliteOrderStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("web_server_starting");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        port = config.port,
        database_configured = config.database_url.is_some(),
        store_timeout_ms = config.store_timeout_ms,
        "config_loaded"
    );

    let store: Arc<dyn OrderStore> = match &config.database_url {
        Some(url) => Arc::new(
            SqliteOrderStore::connect(url, config.database_max_connections)
                .await
                .context("Failed to open order store")?,
        ),
        None => {
            warn!("order_store_in_memory");
            Arc::new(MemoryOrderStore::new())
        }
    };

    // Create application state
    let verifier = SignatureVerifier::new(config.server_key.clone());
    let reconciler = OrderReconciler::new(store, config.store_timeout());
    let app = router(AppState::new(verifier, reconciler));

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "web_server_listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("web_server_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "ctrl_c_handler_unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "sigterm_handler_unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("web_server_shutting_down");
}
