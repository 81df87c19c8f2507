//! Prometheus /metrics + health check HTTP endpoints
//!
//! Endpoints (no API key; bind to a private address):
//!   GET /metrics - Prometheus text format
//!   GET /healthz - Liveness probe (always 200 if process is running)
//!   GET /readyz  - Readiness probe (200 if the served directory is readable)

use anyhow::Result;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Router};
use prometheus_client::{
    encoding::text::encode,
    metrics::{counter::Counter, family::Family},
    registry::Registry,
};
use std::path::PathBuf;
use std::sync::Arc;

type Labels = Vec<(String, String)>;

/// Delivery counters shared by all request handlers.
#[derive(Clone, Default)]
pub struct DeliveryMetrics {
    pub downloads: Family<Labels, Counter>,
    pub failures: Family<Labels, Counter>,
    pub auth_rejections: Counter,
    pub plaintext_bytes: Counter,
}

impl DeliveryMetrics {
    pub fn new(registry: &mut Registry) -> Self {
        let metrics = Self::default();

        registry.register(
            "ecdn_downloads",
            "Downloads whose response was started, by delivery strategy",
            metrics.downloads.clone(),
        );
        registry.register(
            "ecdn_download_failures",
            "Download failures by pipeline stage",
            metrics.failures.clone(),
        );
        registry.register(
            "ecdn_auth_rejections",
            "Requests rejected for a missing or invalid API key",
            metrics.auth_rejections.clone(),
        );
        registry.register(
            "ecdn_plaintext_bytes",
            "Plaintext bytes accepted for delivery",
            metrics.plaintext_bytes.clone(),
        );

        metrics
    }

    pub fn record_download(&self, strategy: &str, bytes: u64) {
        self.downloads.get_or_create(&label("strategy", strategy)).inc();
        self.plaintext_bytes.inc_by(bytes);
    }

    pub fn record_failure(&self, stage: &str) {
        self.failures.get_or_create(&label("stage", stage)).inc();
    }

    pub fn downloads_for(&self, strategy: &str) -> u64 {
        self.downloads.get_or_create(&label("strategy", strategy)).get()
    }

    pub fn failures_for(&self, stage: &str) -> u64 {
        self.failures.get_or_create(&label("stage", stage)).get()
    }
}

fn label(name: &str, value: &str) -> Labels {
    vec![(name.to_string(), value.to_string())]
}

/// Shared state for the operational listener
#[derive(Clone)]
pub struct HealthState {
    pub registry: Arc<Registry>,
    pub base_dir: PathBuf,
}

pub fn health_router(state: HealthState) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/healthz", get(healthz_handler))
        .route("/readyz", get(readyz_handler))
        .with_state(state)
}

/// Serve Prometheus metrics and health endpoints on `addr` (e.g. "127.0.0.1:9100")
pub async fn serve(addr: String, state: HealthState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("metrics bind {addr}: {e}"))?;

    tracing::info!(addr = %addr, "metrics: listening on /metrics, /healthz, /readyz");

    axum::serve(listener, health_router(state))
        .await
        .map_err(|e| anyhow::anyhow!("metrics server: {e}"))
}

async fn metrics_handler(State(state): State<HealthState>) -> impl IntoResponse {
    let mut body = String::new();
    match encode(&mut body, &state.registry) {
        Ok(()) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4")],
            body,
        ),
        Err(e) => {
            tracing::error!("metrics encode failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                e.to_string(),
            )
        }
    }
}

/// Liveness probe: returns 200 if the process is running.
async fn healthz_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Readiness probe: returns 200 if the served directory can be read, 503 otherwise.
async fn readyz_handler(State(state): State<HealthState>) -> impl IntoResponse {
    match tokio::fs::read_dir(&state.base_dir).await {
        Ok(_) => (StatusCode::OK, "ready"),
        Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "base directory unreadable"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_register_and_encode() {
        let mut registry = Registry::default();
        let metrics = DeliveryMetrics::new(&mut registry);

        metrics.record_download("buffered", 10);
        metrics.record_download("streamed", 20);
        metrics.record_failure("read");
        metrics.auth_rejections.inc();

        assert_eq!(metrics.downloads_for("buffered"), 1);
        assert_eq!(metrics.downloads_for("streamed"), 1);
        assert_eq!(metrics.failures_for("read"), 1);
        assert_eq!(metrics.plaintext_bytes.get(), 30);

        let mut body = String::new();
        encode(&mut body, &registry).unwrap();
        assert!(body.contains("ecdn_downloads_total"));
        assert!(body.contains("strategy=\"buffered\""));
        assert!(body.contains("ecdn_auth_rejections_total 1"));
    }
}
