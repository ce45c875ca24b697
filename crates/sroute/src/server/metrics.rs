//! Front door counters

use sroute_metrics::{Counter, CounterVec, MetricFamily, MetricsProvider};

/// Remote-write receiver metrics
#[derive(Debug)]
pub struct ReceiveMetrics {
    /// Write requests received
    pub requests: Counter,
    /// Compressed body bytes received
    pub bytes: Counter,
    /// Series accepted
    pub series: Counter,
    /// Samples accepted
    pub samples: Counter,
    /// Rejected requests, keyed by reason
    pub rejected: CounterVec,
}

impl ReceiveMetrics {
    /// Create zeroed metrics
    pub fn new() -> Self {
        Self {
            requests: Counter::new(),
            bytes: Counter::new(),
            series: Counter::new(),
            samples: Counter::new(),
            rejected: CounterVec::new("reason"),
        }
    }
}

impl Default for ReceiveMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsProvider for ReceiveMetrics {
    fn component(&self) -> &'static str {
        "receive"
    }

    fn families(&self) -> Vec<MetricFamily> {
        vec![
            MetricFamily::counter(
                "receive_requests_total",
                "Remote-write requests received.",
                &self.requests,
            ),
            MetricFamily::counter(
                "receive_bytes_total",
                "Compressed request bytes received.",
                &self.bytes,
            ),
            MetricFamily::counter(
                "receive_series_total",
                "Series accepted for routing.",
                &self.series,
            ),
            MetricFamily::counter(
                "receive_samples_total",
                "Samples accepted for routing.",
                &self.samples,
            ),
            MetricFamily::counter_vec(
                "receive_rejected_total",
                "Requests rejected, by reason.",
                &self.rejected,
            ),
        ]
    }
}
