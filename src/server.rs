//! API server startup.

use anyhow::Context;
use std::sync::Arc;

use crate::api::{self, AppState};
use crate::config::Config;
use crate::db;

/// Open the store, then serve the API until Ctrl+C.
pub async fn serve(config: &Config) -> anyhow::Result<()> {
    let path = &config.database.path;

    tracing::info!("Opening database at {}", path.display());
    let pool = db::connect(path)
        .await
        .with_context(|| format!("failed to open database at {}", path.display()))?;

    tracing::info!("Initializing schema...");
    db::initialize(&pool, config.database.prefill).await?;

    let state = Arc::new(AppState {
        db: pool.clone(),
        database: config.database.clone(),
    });
    let app = api::router(state);

    let bind = (config.server.host.as_str(), config.server.port);
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {}:{}", bind.0, bind.1))?;
    tracing::info!("Starting server on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("server failed")?;

    tracing::info!("Shutting down");
    pool.close().await;
    Ok(())
}
