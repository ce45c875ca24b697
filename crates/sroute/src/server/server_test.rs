//! Front door tests

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use parking_lot::Mutex;
use sroute_metrics::Registry;
use sroute_pipeline::{Route, Router as RouteRegistry, RouterMetrics};
use sroute_protocol::{Series, encode_write_request};
use sroute_sinks::{Sink, StoreStatus};
use sroute_transform::RelabelChain;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use super::*;

/// Sink that keeps every series it receives
struct CollectSink(Arc<Mutex<Vec<Series>>>);

#[async_trait]
impl Sink for CollectSink {
    fn kind(&self) -> &'static str {
        "collect"
    }

    async fn store(&self, series: Vec<Series>) -> sroute_sinks::Result<StoreStatus> {
        self.0.lock().extend(series);
        Ok(StoreStatus::Delivered)
    }
}

struct TestContext {
    state: Arc<AppState>,
    stored: Arc<Mutex<Vec<Series>>>,
}

fn test_state(with_route: bool, max_body_size: usize) -> TestContext {
    let router_metrics = Arc::new(RouterMetrics::new());
    let router = Arc::new(RouteRegistry::new(Arc::clone(&router_metrics)));
    let stored = Arc::new(Mutex::new(Vec::new()));
    if with_route {
        let sink = CollectSink(Arc::clone(&stored));
        router.install(vec![Arc::new(Route::new(
            "collect",
            RelabelChain::empty(),
            Box::new(sink),
        ))]);
    }

    let metrics = Arc::new(ReceiveMetrics::new());
    let registry = Registry::new("sroute")
        .with_provider(metrics.clone())
        .with_provider(router_metrics);

    TestContext {
        state: Arc::new(AppState {
            router,
            registry,
            metrics,
            max_body_size,
            shutdown: CancellationToken::new(),
        }),
        stored,
    }
}

fn write_body() -> Vec<u8> {
    let series = vec![
        Series::from_pairs([("__name__", "up"), ("job", "node")]).with_sample(1.0, 1000),
        Series::from_pairs([("__name__", "up"), ("job", "api")])
            .with_sample(0.0, 1000)
            .with_sample(1.0, 2000),
    ];
    encode_write_request(&series).unwrap()
}

fn post(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-encoding", "snappy")
        .header("content-type", "application/x-protobuf")
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 4096).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

// =============================================================================
// Health and readiness
// =============================================================================

#[tokio::test]
async fn test_health_ok() {
    let ctx = test_state(true, 1024 * 1024);
    let response = build_router(ctx.state).oneshot(get("/-/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["code"], 2000);
    assert_eq!(json["msg"], "ok");
    assert!(json["data"].is_null());
}

#[tokio::test]
async fn test_health_fails_after_shutdown() {
    let ctx = test_state(true, 1024 * 1024);
    ctx.state.shutdown.cancel();

    let response = build_router(ctx.state).oneshot(get("/-/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = json_body(response).await;
    assert_eq!(json["msg"], "no health");
}

#[tokio::test]
async fn test_ready_requires_routes() {
    let empty = test_state(false, 1024 * 1024);
    let response = build_router(empty.state).oneshot(get("/-/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let routed = test_state(true, 1024 * 1024);
    let response = build_router(routed.state).oneshot(get("/-/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// Write
// =============================================================================

#[tokio::test]
async fn test_write_dispatches_batch() {
    let ctx = test_state(true, 1024 * 1024);
    let app = build_router(Arc::clone(&ctx.state));

    let response = app.oneshot(post("/api/v1/write", write_body())).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    ctx.state.router.flush().await;
    assert_eq!(ctx.stored.lock().len(), 2);
    assert_eq!(ctx.state.metrics.requests.get(), 1);
    assert_eq!(ctx.state.metrics.series.get(), 2);
    assert_eq!(ctx.state.metrics.samples.get(), 3);
    assert!(ctx.state.metrics.bytes.get() > 0);
}

#[tokio::test]
async fn test_receive_alias() {
    let ctx = test_state(true, 1024 * 1024);
    let response = build_router(Arc::clone(&ctx.state))
        .oneshot(post("/api/v1/receive", write_body()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    ctx.state.router.flush().await;
    assert_eq!(ctx.stored.lock().len(), 2);
}

#[tokio::test]
async fn test_write_rejects_invalid_snappy() {
    let ctx = test_state(true, 1024 * 1024);
    let response = build_router(Arc::clone(&ctx.state))
        .oneshot(post("/api/v1/write", b"definitely not snappy".to_vec()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"], "decode");
    assert_eq!(ctx.state.metrics.rejected.get("decode"), 1);
}

#[tokio::test]
async fn test_write_rejects_empty_request() {
    let ctx = test_state(true, 1024 * 1024);
    let body = encode_write_request(&[]).unwrap();
    let response = build_router(Arc::clone(&ctx.state))
        .oneshot(post("/api/v1/write", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(ctx.state.metrics.rejected.get("empty"), 1);
}

#[tokio::test]
async fn test_write_without_routes_is_server_error() {
    let ctx = test_state(false, 1024 * 1024);
    let response = build_router(Arc::clone(&ctx.state))
        .oneshot(post("/api/v1/write", write_body()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(ctx.state.metrics.rejected.get("no_routes"), 1);
    assert_eq!(ctx.state.router.metrics().no_routes.get(), 1);
}

#[tokio::test]
async fn test_write_body_limit() {
    let ctx = test_state(true, 64);
    let response = build_router(Arc::clone(&ctx.state))
        .oneshot(post("/api/v1/write", vec![0u8; 4096]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(ctx.state.metrics.rejected.get("too_large"), 1);
}

// =============================================================================
// Metrics and serving
// =============================================================================

#[tokio::test]
async fn test_metrics_exposition() {
    let ctx = test_state(true, 1024 * 1024);
    ctx.state.metrics.requests.add(7);

    let response = build_router(ctx.state).oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/plain")
    );

    let body = axum::body::to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("# TYPE sroute_receive_requests_total counter"));
    assert!(text.contains("sroute_receive_requests_total 7"));
    assert!(text.contains("sroute_router_routes 1"));
}

#[tokio::test]
async fn test_start_stops_on_cancel() {
    let ctx = test_state(true, 1024 * 1024);
    let cancel = ctx.state.shutdown.clone();

    let (addr, handle) = start("127.0.0.1:0", ctx.state).await.unwrap();
    assert_ne!(addr.port(), 0);

    cancel.cancel();
    tokio::time::timeout(std::time::Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
}
