//! Queue sink counters

use sroute_metrics::{CounterVec, MetricFamily, MetricsProvider};

/// Counters shared by every queue sink, keyed by route
#[derive(Debug)]
pub struct QueueMetrics {
    /// `store` calls
    pub batches: CounterVec,
    /// Samples encoded into messages
    pub serialized: CounterVec,
    /// Samples dropped by the serializer
    pub serialize_failed: CounterVec,
    /// Samples dropped by the match list
    pub filtered: CounterVec,
    /// Messages acknowledged by the broker
    pub written: CounterVec,
    /// Messages given up on after retries
    pub failed: CounterVec,
    /// Publisher recreations
    pub reconnects: CounterVec,
    /// Series dropped because their topic could not be rendered
    pub topic_errors: CounterVec,
}

impl QueueMetrics {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self {
            batches: CounterVec::new("route"),
            serialized: CounterVec::new("route"),
            serialize_failed: CounterVec::new("route"),
            filtered: CounterVec::new("route"),
            written: CounterVec::new("route"),
            failed: CounterVec::new("route"),
            reconnects: CounterVec::new("route"),
            topic_errors: CounterVec::new("route"),
        }
    }
}

impl Default for QueueMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsProvider for QueueMetrics {
    fn component(&self) -> &'static str {
        "queue"
    }

    fn families(&self) -> Vec<MetricFamily> {
        vec![
            MetricFamily::counter_vec(
                "queue_batches_total",
                "Batches handed to a queue sink.",
                &self.batches,
            ),
            MetricFamily::counter_vec(
                "queue_serialized_total",
                "Samples serialized into queue messages.",
                &self.serialized,
            ),
            MetricFamily::counter_vec(
                "queue_serialize_failed_total",
                "Samples dropped because they could not be serialized.",
                &self.serialize_failed,
            ),
            MetricFamily::counter_vec(
                "queue_filtered_total",
                "Samples dropped by the match allow-list.",
                &self.filtered,
            ),
            MetricFamily::counter_vec(
                "queue_written_total",
                "Messages acknowledged by the broker.",
                &self.written,
            ),
            MetricFamily::counter_vec(
                "queue_failed_total",
                "Messages dropped after publish retries were exhausted.",
                &self.failed,
            ),
            MetricFamily::counter_vec(
                "queue_reconnects_total",
                "Producer recreations after connection-level failures.",
                &self.reconnects,
            ),
            MetricFamily::counter_vec(
                "queue_topic_errors_total",
                "Series dropped because the topic template failed.",
                &self.topic_errors,
            ),
        ]
    }
}
