//! # PostgreSQL HA/DR Demo API Server
//!
//! ## Usage
//!
//! ```bash
//! # Run with defaults (config/pgha.toml is read when present)
//! cargo run --bin pgha-api
//!
//! # Point at another database and stanza
//! DB_HOST=pg-primary PGBACKREST_STANZA=main cargo run --bin pgha-api
//! ```

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use pgha_api::config::ConfigManager;
use pgha_api::database::DatabaseConnection;
use pgha_api::logging;
use pgha_api::web::{create_app, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = ConfigManager::load().context("Failed to load configuration")?;
    logging::init_structured_logging(settings.app.debug);

    info!("Starting {}", settings.app.name);
    info!("   Version: {}", settings.app.version);
    // Loading ran before a subscriber existed; repeat the effective values here
    info!(
        settings = %ConfigManager::sanitize_for_logging(&settings),
        "   Configuration loaded"
    );
    info!(
        "   Build Mode: {}",
        if cfg!(debug_assertions) {
            "Debug"
        } else {
            "Release"
        }
    );

    let database = DatabaseConnection::from_config(&settings.database);
    database.warm_up().await;

    let bind_address = settings.app.bind_address();
    let app_state = AppState::from_settings(settings, database.pool().clone());
    let app = create_app(app_state);

    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {bind_address}"))?;
    info!("   Listening on http://{bind_address}");
    info!("   Press Ctrl+C to shutdown gracefully");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Shutdown signal handled, closing database pool");
    database.close().await;
    info!("Server shutdown complete");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C");
        },
        _ = terminate => {
            info!("Received SIGTERM");
        },
    }
}
