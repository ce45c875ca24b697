//! ClusterSink - sharded fan-out to remote-write endpoints

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use sroute_config::ClusterConfig;
use sroute_protocol::Series;
use sroute_routing::ShardTable;
use tokio_util::task::TaskTracker;

use super::metrics::RemoteWriteMetrics;
use super::writer::EndpointWriter;
use crate::util::{DEFAULT_LOG_INTERVAL, RateLimitedLogger};
use crate::{Result, Sink, SinkError, StoreStatus};

/// Remote-write sink spreading series over a fixed set of endpoints
///
/// Each populated node gets its own detached delivery task; one endpoint
/// failing never delays or fails its siblings.
pub struct ClusterSink {
    route: String,
    table: ShardTable,
    shared: Arc<Shared>,
    tracker: TaskTracker,
}

/// State cloned into every delivery task
struct Shared {
    writers: Vec<EndpointWriter>,
    metrics: Arc<RemoteWriteMetrics>,
    logger: RateLimitedLogger,
}

impl ClusterSink {
    /// Build a sink for `route` from its cluster config
    pub fn new(
        route: impl Into<String>,
        config: &ClusterConfig,
        metrics: Arc<RemoteWriteMetrics>,
    ) -> Result<Self> {
        let route = route.into();
        let table = ShardTable::new(
            config.urls.len(),
            config.dimension,
            config.filter_labels.clone(),
        )
        .map_err(|e| SinkError::build("remote_write", route.clone(), e))?;

        let writers = config
            .urls
            .iter()
            .map(|url| EndpointWriter::new(url.clone(), config.timeout))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            route = %route,
            endpoints = writers.len(),
            dimension = config.dimension,
            filter_labels = ?config.filter_labels,
            "remote-write cluster sink built"
        );

        Ok(Self {
            shared: Arc::new(Shared {
                writers,
                metrics,
                logger: RateLimitedLogger::new(route.clone(), DEFAULT_LOG_INTERVAL),
            }),
            route,
            table,
            tracker: TaskTracker::new(),
        })
    }

    /// Route this sink belongs to
    pub fn route(&self) -> &str {
        &self.route
    }

    /// Placement table
    pub fn table(&self) -> &ShardTable {
        &self.table
    }

    /// Endpoint URLs in node order
    pub fn endpoints(&self) -> impl Iterator<Item = &str> {
        self.shared.writers.iter().map(EndpointWriter::url)
    }

    /// Shard `series` and deliver every populated node, waiting for all
    ///
    /// Returns `(node, result)` per populated node.
    pub async fn store_and_wait(&self, series: Vec<Series>) -> Vec<(usize, Result<()>)> {
        let shards = self.shard(series);
        let deliveries = shards.into_iter().map(|(node, batch)| {
            let shared = Arc::clone(&self.shared);
            async move { (node, shared.deliver(node, batch).await) }
        });
        join_all(deliveries).await
    }

    /// Count and partition `series` into per-node batches
    fn shard(&self, series: Vec<Series>) -> Vec<(usize, Vec<Series>)> {
        let metrics = &self.shared.metrics;
        metrics.cluster_series.add(&self.route, series.len() as u64);

        let partition = self.table.partition(series);
        if partition.invalid > 0 {
            metrics
                .cluster_series_invalid
                .add(&self.route, partition.invalid as u64);
            tracing::debug!(
                route = %self.route,
                invalid = partition.invalid,
                "skipped series with empty label set"
            );
        }
        partition.populated().collect()
    }
}

impl Shared {
    /// Send one node's batch and record the outcome
    async fn deliver(&self, node: usize, series: Vec<Series>) -> Result<()> {
        let Some(writer) = self.writers.get(node) else {
            return Err(SinkError::permanent(
                format!("node {}", node),
                None,
                "node outside endpoint table",
            ));
        };

        let count = series.len() as u64;
        let endpoint = writer.url();
        self.metrics.series.add(endpoint, count);

        let result = writer.write(&series).await;
        if let Err(e) = &result {
            self.metrics.series_failed.add(endpoint, count);
            if e.is_recoverable() {
                self.metrics.recoverable_errors.inc(endpoint);
                tracing::warn!(
                    endpoint = %endpoint,
                    series = count,
                    error = %e,
                    "remote write failed, recoverable"
                );
            } else {
                self.metrics.permanent_errors.inc(endpoint);
                self.logger.error("remote write failed, batch dropped", e);
            }
        }
        result
    }
}

#[async_trait]
impl Sink for ClusterSink {
    fn kind(&self) -> &'static str {
        "remote_write"
    }

    async fn store(&self, series: Vec<Series>) -> Result<StoreStatus> {
        let shards = self.shard(series);
        if shards.is_empty() {
            return Ok(StoreStatus::Empty);
        }

        let tasks = shards.len();
        for (node, batch) in shards {
            let shared = Arc::clone(&self.shared);
            self.tracker.spawn(async move {
                let _ = shared.deliver(node, batch).await;
            });
        }
        Ok(StoreStatus::Dispatched { tasks })
    }

    async fn drain(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }
}
