//! Front door HTTP server
//!
//! Receives Prometheus remote-write requests, decodes them and hands each
//! batch to the router without waiting for delivery.
//!
//! # Endpoints
//!
//! - `POST /api/v1/write`, `POST /api/v1/receive` - remote-write ingest
//! - `GET /-/health` - liveness, fails once shutdown has begun
//! - `GET /-/ready` - readiness, requires at least one active route
//! - `GET /metrics` - Prometheus text exposition

mod error;
mod handlers;
mod metrics;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use sroute_metrics::Registry;
use sroute_pipeline::Router as RouteRegistry;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub use error::ReceiveError;
pub use metrics::ReceiveMetrics;

/// Shared state for handlers
pub struct AppState {
    pub router: Arc<RouteRegistry>,
    pub registry: Registry,
    pub metrics: Arc<ReceiveMetrics>,
    pub max_body_size: usize,
    /// Cancelled once shutdown begins; health turns red
    pub shutdown: CancellationToken,
}

/// Build the axum router
pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_body_size);
    Router::new()
        .route("/api/v1/write", post(handlers::write))
        .route("/api/v1/receive", post(handlers::write))
        .route("/-/health", get(handlers::health))
        .route("/-/ready", get(handlers::ready))
        .route("/metrics", get(handlers::metrics))
        .layer(body_limit)
        .with_state(state)
}

/// Bind `addr` and serve until `state.shutdown` is cancelled
pub async fn start(addr: &str, state: Arc<AppState>) -> anyhow::Result<(SocketAddr, JoinHandle<()>)> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", addr, e))?;
    let local = listener.local_addr()?;
    let cancel = state.shutdown.clone();
    let app = build_router(state);

    tracing::info!(addr = %local, "remote-write receiver listening");

    let handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                cancel.cancelled().await;
            })
            .await
            .unwrap_or_else(|e| {
                tracing::error!(error = %e, "receiver error");
            });
    });

    Ok((local, handle))
}

#[cfg(test)]
#[path = "server_test.rs"]
mod tests;
