//! Remote-write cluster counters

use sroute_metrics::{CounterVec, MetricFamily, MetricsProvider};

/// Counters shared by every cluster sink
///
/// Created once at startup and handed to each sink on every rebuild, so
/// totals survive configuration reloads.
#[derive(Debug)]
pub struct RemoteWriteMetrics {
    /// Series handed to a cluster sink, per route
    pub cluster_series: CounterVec,
    /// Series skipped for having no labels, per route
    pub cluster_series_invalid: CounterVec,
    /// Series sent to an endpoint, per endpoint
    pub series: CounterVec,
    /// Series whose delivery failed, per endpoint
    pub series_failed: CounterVec,
    /// Transient delivery failures, per endpoint
    pub recoverable_errors: CounterVec,
    /// Permanent delivery failures, per endpoint
    pub permanent_errors: CounterVec,
}

impl RemoteWriteMetrics {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self {
            cluster_series: CounterVec::new("route"),
            cluster_series_invalid: CounterVec::new("route"),
            series: CounterVec::new("endpoint"),
            series_failed: CounterVec::new("endpoint"),
            recoverable_errors: CounterVec::new("endpoint"),
            permanent_errors: CounterVec::new("endpoint"),
        }
    }
}

impl Default for RemoteWriteMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsProvider for RemoteWriteMetrics {
    fn component(&self) -> &'static str {
        "remote_write"
    }

    fn families(&self) -> Vec<MetricFamily> {
        vec![
            MetricFamily::counter_vec(
                "remote_write_cluster_series_total",
                "Series handed to a remote-write cluster sink.",
                &self.cluster_series,
            ),
            MetricFamily::counter_vec(
                "remote_write_cluster_series_invalid_total",
                "Series skipped because their label set was empty.",
                &self.cluster_series_invalid,
            ),
            MetricFamily::counter_vec(
                "remote_write_series_total",
                "Series sent to a remote-write endpoint.",
                &self.series,
            ),
            MetricFamily::counter_vec(
                "remote_write_series_failed_total",
                "Series whose delivery to an endpoint failed.",
                &self.series_failed,
            ),
            MetricFamily::counter_vec(
                "remote_write_recoverable_errors_total",
                "Transient delivery failures (transport errors, timeouts, 5xx).",
                &self.recoverable_errors,
            ),
            MetricFamily::counter_vec(
                "remote_write_permanent_errors_total",
                "Permanent delivery failures (non-5xx error responses, encoding).",
                &self.permanent_errors,
            ),
        ]
    }
}
