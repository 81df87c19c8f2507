use anyhow::Result;
use axum::{middleware, routing::get, Router};

use crate::{auth, delivery, listing, state::AppState};

/// File API: every route sits behind the API-key gate.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/download/{filename}", get(delivery::download))
        .route("/files", get(listing::list_files))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ))
        .with_state(state)
}

/// Serve the file API on `addr` until ctrl-c.
pub async fn serve(addr: &str, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("bind {addr}: {e}"))?;

    tracing::info!(addr = %addr, base_dir = %state.base_dir.display(), "file API: listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("file API server: {e}"))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("installing ctrl-c handler failed: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
