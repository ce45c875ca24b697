//! Router metrics
//!
//! Created once at startup and shared across rebuilds, so route counters keep
//! accumulating when the table is swapped.

use sroute_metrics::{Counter, CounterVec, Gauge, MetricFamily, MetricsProvider};

/// Dispatch counters
#[derive(Debug)]
pub struct RouterMetrics {
    /// Batches handed to `dispatch`
    pub batches: Counter,
    /// Batches rejected because no route was active
    pub no_routes: Counter,
    /// Series handed to a route's sink
    pub series: CounterVec,
    /// Series dropped by a route's relabel chain
    pub series_filtered: CounterVec,
    /// `store` calls that returned an error
    pub store_failed: CounterVec,
    /// Active route count
    pub routes: Gauge,
    /// Route deliveries currently running
    pub inflight: Gauge,
}

impl RouterMetrics {
    /// Create zeroed metrics
    pub fn new() -> Self {
        Self {
            batches: Counter::new(),
            no_routes: Counter::new(),
            series: CounterVec::new("route"),
            series_filtered: CounterVec::new("route"),
            store_failed: CounterVec::new("route"),
            routes: Gauge::new(),
            inflight: Gauge::new(),
        }
    }
}

impl Default for RouterMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsProvider for RouterMetrics {
    fn component(&self) -> &'static str {
        "router"
    }

    fn families(&self) -> Vec<MetricFamily> {
        vec![
            MetricFamily::counter(
                "router_batches_total",
                "Batches handed to the router.",
                &self.batches,
            ),
            MetricFamily::counter(
                "router_no_routes_total",
                "Batches rejected because no route was configured.",
                &self.no_routes,
            ),
            MetricFamily::counter_vec(
                "router_series_total",
                "Series forwarded to a route's sink.",
                &self.series,
            ),
            MetricFamily::counter_vec(
                "router_series_filtered_total",
                "Series dropped by a route's relabel chain.",
                &self.series_filtered,
            ),
            MetricFamily::counter_vec(
                "router_store_failed_total",
                "Sink store calls that returned an error.",
                &self.store_failed,
            ),
            MetricFamily::gauge("router_routes", "Active routes.", &self.routes),
            MetricFamily::gauge(
                "router_inflight",
                "Route deliveries currently running.",
                &self.inflight,
            ),
        ]
    }
}
