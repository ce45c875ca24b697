//! SinkFactory - builds a route's sink from its upstream config

use std::sync::Arc;

use sroute_config::UpstreamConfig;

use crate::queue::{QueueMetrics, QueueSink, Serializer};
use crate::remote_write::{ClusterSink, RemoteWriteMetrics};
use crate::{Result, Sink};

/// Long-lived dependencies injected into every sink
///
/// Built once at startup; every reload reuses the same counters and the
/// process-wide serializer.
#[derive(Clone)]
pub struct SinkFactory {
    remote_write_metrics: Arc<RemoteWriteMetrics>,
    queue_metrics: Arc<QueueMetrics>,
    serializer: Arc<dyn Serializer>,
}

impl SinkFactory {
    /// Create a factory
    pub fn new(
        remote_write_metrics: Arc<RemoteWriteMetrics>,
        queue_metrics: Arc<QueueMetrics>,
        serializer: Arc<dyn Serializer>,
    ) -> Self {
        Self {
            remote_write_metrics,
            queue_metrics,
            serializer,
        }
    }

    /// Remote-write counters
    pub fn remote_write_metrics(&self) -> &Arc<RemoteWriteMetrics> {
        &self.remote_write_metrics
    }

    /// Queue counters
    pub fn queue_metrics(&self) -> &Arc<QueueMetrics> {
        &self.queue_metrics
    }

    /// Build the sink for `route`
    pub fn build(&self, route: &str, upstream: &UpstreamConfig) -> Result<Box<dyn Sink>> {
        let sink: Box<dyn Sink> = match upstream {
            UpstreamConfig::RemoteWrite(cluster) => Box::new(ClusterSink::new(
                route,
                cluster,
                Arc::clone(&self.remote_write_metrics),
            )?),
            UpstreamConfig::Kafka(kafka) => Box::new(QueueSink::new(
                route,
                kafka,
                Arc::clone(&self.serializer),
                Arc::clone(&self.queue_metrics),
            )?),
        };
        Ok(sink)
    }
}

impl std::fmt::Debug for SinkFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkFactory")
            .field("serializer", &self.serializer.format())
            .finish_non_exhaustive()
    }
}
