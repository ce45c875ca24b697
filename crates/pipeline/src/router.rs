//! Router - concurrent fan-out of each batch to every active route
//!
//! The route table is swapped wholesale on rebuild. `dispatch` reads it once
//! per call and spawns one detached task per route; results are reported
//! through counters and logs, never back to the caller.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use sroute_config::RouteConfig;
use sroute_protocol::Batch;
use sroute_sinks::SinkFactory;
use tokio_util::task::TaskTracker;

use crate::metrics::RouterMetrics;
use crate::route::{BuildReport, Route, build_routes};
use crate::{PipelineError, Result};

/// Snapshot of the active route table
type RouteTable = Arc<Vec<Arc<Route>>>;

/// Accepted dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchStatus {
    /// Routes the batch was handed to
    pub routes: usize,
}

/// Registry of active routes
pub struct Router {
    routes: RwLock<RouteTable>,
    metrics: Arc<RouterMetrics>,
    tracker: TaskTracker,
}

impl Router {
    /// Create a router with an empty table
    pub fn new(metrics: Arc<RouterMetrics>) -> Self {
        Self {
            routes: RwLock::new(Arc::new(Vec::new())),
            metrics,
            tracker: TaskTracker::new(),
        }
    }

    /// Shared metrics handle
    pub fn metrics(&self) -> &Arc<RouterMetrics> {
        &self.metrics
    }

    /// Current route table
    pub fn routes(&self) -> RouteTable {
        Arc::clone(&self.routes.read())
    }

    /// Number of active routes
    pub fn route_count(&self) -> usize {
        self.routes.read().len()
    }

    /// Names of active routes in table order
    pub fn route_names(&self) -> Vec<String> {
        self.routes
            .read()
            .iter()
            .map(|route| route.name().to_string())
            .collect()
    }

    /// Build a new table from `configs` and install it
    ///
    /// Routes that fail to build are left out and listed in the report.
    pub fn rebuild(&self, configs: &[RouteConfig], factory: &SinkFactory) -> BuildReport {
        let report = build_routes(configs, factory);
        self.install(report.routes.clone());
        tracing::info!(
            routes = report.routes.len(),
            failed = report.failed.len(),
            "route table rebuilt"
        );
        report
    }

    /// Replace the route table
    ///
    /// Dispatches already running keep the old table; the old sinks are
    /// drained in the background once the swap is done.
    pub fn install(&self, routes: Vec<Arc<Route>>) {
        let count = routes.len();
        let old = std::mem::replace(&mut *self.routes.write(), Arc::new(routes));
        self.metrics.routes.set(count as i64);

        if old.is_empty() {
            return;
        }
        self.tracker.spawn(async move {
            for route in old.iter() {
                route.sink().drain().await;
            }
            tracing::debug!(routes = old.len(), "previous route table drained");
        });
    }

    /// Hand `batch` to every active route without waiting for delivery
    ///
    /// Fails only when no route is configured.
    pub fn dispatch(&self, batch: Batch) -> Result<DispatchStatus> {
        self.metrics.batches.inc();

        let routes = self.routes();
        if routes.is_empty() {
            self.metrics.no_routes.inc();
            return Err(PipelineError::NoRoutes);
        }

        let batch = Arc::new(batch);
        for route in routes.iter() {
            let route = Arc::clone(route);
            let batch = Arc::clone(&batch);
            let metrics = Arc::clone(&self.metrics);
            metrics.inflight.inc();
            self.tracker.spawn(async move {
                let _inflight = InflightGuard(&metrics);
                deliver(&route, &batch, &metrics).await;
            });
        }

        Ok(DispatchStatus {
            routes: routes.len(),
        })
    }

    /// Wait until every dispatch and sink-side delivery started so far is done
    pub async fn flush(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();

        for route in self.routes().iter() {
            route.sink().drain().await;
        }
    }

    /// Flush within `timeout`; returns false if deliveries were still running
    pub async fn shutdown(&self, timeout: Duration) -> bool {
        match tokio::time::timeout(timeout, self.flush()).await {
            Ok(()) => {
                tracing::info!("router drained");
                true
            }
            Err(_) => {
                tracing::warn!(
                    timeout = ?timeout,
                    inflight = self.metrics.inflight.get(),
                    "router drain timed out, abandoning in-flight deliveries"
                );
                false
            }
        }
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.route_names())
            .finish_non_exhaustive()
    }
}

/// Decrements the in-flight gauge when a route task ends
struct InflightGuard<'a>(&'a RouterMetrics);

impl Drop for InflightGuard<'_> {
    fn drop(&mut self) {
        self.0.inflight.dec();
    }
}

/// Filter `batch` through one route and store the survivors
async fn deliver(route: &Route, batch: &Batch, metrics: &RouterMetrics) {
    let outcome = route.filter(batch);
    if outcome.dropped > 0 {
        metrics
            .series_filtered
            .add(route.name(), outcome.dropped as u64);
    }
    if outcome.kept.is_empty() {
        tracing::trace!(route = %route.name(), "every series filtered out");
        return;
    }

    let kept = outcome.kept.len();
    metrics.series.add(route.name(), kept as u64);

    match route.sink().store(outcome.kept).await {
        Ok(status) => {
            tracing::trace!(route = %route.name(), series = kept, status = ?status, "route stored");
        }
        Err(e) => {
            metrics.store_failed.inc(route.name());
            tracing::warn!(
                route = %route.name(),
                sink = route.sink().kind(),
                series = kept,
                recoverable = e.is_recoverable(),
                error = %e,
                "route delivery failed"
            );
        }
    }
}
