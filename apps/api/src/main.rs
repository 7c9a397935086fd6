//! # Pizzatrack API Server
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Admin console ───► HTTP (8080) ───► Router ───► SQLite (WAL)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Environment
//! - `PIZZATRACK_HTTP_PORT`, `PIZZATRACK_BIND_ADDR`
//! - `PIZZATRACK_DB_PATH`, `PIZZATRACK_DB_MAX_CONN`
//! - `PIZZATRACK_CORS_ORIGIN`
//! - `RUST_LOG`

use anyhow::Context;
use tracing::{error, info};

use pizzatrack_api::{build_app, cors_layer, init_tracing, ApiConfig, AppState};
use pizzatrack_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting Pizzatrack API server...");

    let config = ApiConfig::load().context("invalid configuration")?;
    info!(
        port = config.http_port,
        db_path = %config.database_path,
        cors = %config.cors_origin,
        "Configuration loaded"
    );

    let db = Database::new(
        DbConfig::new(&config.database_path).max_connections(config.db_max_connections),
    )
    .await
    .context("failed to open database")?;
    info!("Database ready");

    let cors = cors_layer(&config.cors_origin).context("invalid CORS origin")?;
    let app = build_app(AppState::new(db.clone()), cors);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
