use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use civic_pulse_api::config::config;
use civic_pulse_api::database::{DatabaseManager, Repositories};
use civic_pulse_api::logging::init_tracing;
use civic_pulse_api::storage::LocalImageStore;
use civic_pulse_api::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = config();
    config.validate().context("invalid configuration")?;
    info!("Starting CivicPulse API in {:?} mode", config.environment);

    let manager = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to the database")?;
    manager.migrate().await.context("failed to apply migrations")?;

    let images = LocalImageStore::open(&config.uploads.dir)
        .await
        .context("failed to prepare the uploads directory")?;

    let state = AppState::new(
        Arc::new(config.clone()),
        Repositories::postgres(manager.pool().clone()),
        Arc::new(images),
    );

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("CivicPulse API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped, closing database pool");
    manager.close().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
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
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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
    info!("Shutdown signal received");
}
