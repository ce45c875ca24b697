//! HTTP route handlers

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use sroute_protocol::decode_write_request;

use super::AppState;
use super::error::ReceiveError;

/// Prometheus text exposition content type
const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Status envelope shared by health and readiness
#[derive(Debug, Serialize)]
pub struct Envelope {
    pub code: u32,
    pub msg: &'static str,
    pub data: Option<()>,
}

impl Envelope {
    const fn ok() -> Self {
        Self {
            code: 2000,
            msg: "ok",
            data: None,
        }
    }

    const fn failed(msg: &'static str) -> Self {
        Self {
            code: 0,
            msg,
            data: None,
        }
    }
}

/// POST /api/v1/write - decode and dispatch, without waiting for delivery
pub async fn write(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    state.metrics.requests.inc();

    match accept(&state, body) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            state.metrics.rejected.inc(e.reason());
            tracing::debug!(reason = e.reason(), error = %e, "write rejected");
            e.into_response()
        }
    }
}

fn accept(state: &AppState, body: Result<Bytes, BytesRejection>) -> Result<(), ReceiveError> {
    let body = body.map_err(|rejection| ReceiveError::Body {
        status: rejection.status(),
        message: rejection.body_text(),
    })?;
    state.metrics.bytes.add(body.len() as u64);

    let batch = decode_write_request(&body, state.max_body_size)?;
    if batch.is_empty() {
        return Err(ReceiveError::Empty);
    }

    let series = batch.len() as u64;
    let samples = batch.sample_count() as u64;

    let status = state.router.dispatch(batch)?;
    state.metrics.series.add(series);
    state.metrics.samples.add(samples);
    tracing::trace!(series, samples, routes = status.routes, "batch dispatched");
    Ok(())
}

/// GET /-/health
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    if state.shutdown.is_cancelled() {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(Envelope::failed("no health"))).into_response();
    }
    Json(Envelope::ok()).into_response()
}

/// GET /-/ready
pub async fn ready(State(state): State<Arc<AppState>>) -> Response {
    if state.shutdown.is_cancelled() {
        return (StatusCode::SERVICE_UNAVAILABLE, Json(Envelope::failed("shutting down"))).into_response();
    }
    if state.router.route_count() == 0 {
        return (StatusCode::SERVICE_UNAVAILABLE, Json(Envelope::failed("no routes"))).into_response();
    }
    Json(Envelope::ok()).into_response()
}

/// GET /metrics
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    (
        [(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)],
        state.registry.render(),
    )
        .into_response()
}
