use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use common::storage::FilesystemFileStore;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gallery_server::build_router;
use gallery_server::config::AppConfig;
use gallery_server::database::init_db;
use gallery_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gallery_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load config")?;

    let db = init_db(&config.database)
        .await
        .context("Failed to initialize database")?;

    let files = FilesystemFileStore::new(
        config.storage.content_dir.clone(),
        config.storage.max_file_size,
    )
    .await
    .context("Failed to prepare uploads directory")?;
    info!(path = %config.storage.content_dir.display(), "Uploads directory ready");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        db: db.clone(),
        files: Arc::new(files),
        config,
        started_at: Instant::now(),
    };

    let app = build_router(state);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Gallery API listening on http://{}", addr);
    info!("API docs at http://{}/swagger-ui", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down, closing database connections");
    db.close().await.context("Failed to close database")?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
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
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
