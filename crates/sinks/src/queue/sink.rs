//! QueueSink - one message per sample, grouped by rendered topic

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use parking_lot::RwLock;
use sroute_config::{KafkaConfig, RetryConfig};
use sroute_protocol::Series;
use tokio_util::task::TaskTracker;

use super::kafka::KafkaConnector;
use super::matcher::MatchRules;
use super::metrics::QueueMetrics;
use super::publisher::{Connector, ErrorClass, PublishError, Publisher};
use super::record::MetricRecord;
use super::serializer::Serializer;
use super::topic::TopicTemplate;
use crate::util::{DEFAULT_LOG_INTERVAL, RateLimitedLogger};
use crate::{Result, Sink, SinkError, StoreStatus};

/// Encoded payloads per topic
type TopicBatches = BTreeMap<String, Vec<Vec<u8>>>;

/// Queue sink for one route
pub struct QueueSink {
    inner: Arc<Inner>,
    tracker: TaskTracker,
}

/// State shared with detached publishes
struct Inner {
    route: String,
    topic: TopicTemplate,
    matcher: MatchRules,
    serializer: Arc<dyn Serializer>,
    connector: Arc<dyn Connector>,
    publisher: RwLock<Arc<dyn Publisher>>,
    retry: RetryConfig,
    async_publish: bool,
    metrics: Arc<QueueMetrics>,
    logger: RateLimitedLogger,
}

impl QueueSink {
    /// Build a Kafka-backed sink
    pub fn new(
        route: impl Into<String>,
        config: &KafkaConfig,
        serializer: Arc<dyn Serializer>,
        metrics: Arc<QueueMetrics>,
    ) -> Result<Self> {
        let connector = Arc::new(KafkaConnector::new(config));
        Self::with_connector(route, config, serializer, connector, metrics)
    }

    /// Build a sink publishing through `connector`
    ///
    /// Fails if the topic template or a match rule is malformed, or if the
    /// first publisher cannot be created.
    pub fn with_connector(
        route: impl Into<String>,
        config: &KafkaConfig,
        serializer: Arc<dyn Serializer>,
        connector: Arc<dyn Connector>,
        metrics: Arc<QueueMetrics>,
    ) -> Result<Self> {
        let route = route.into();
        let topic = TopicTemplate::compile(&route, &config.topic)?;
        let matcher = MatchRules::parse(&route, &config.match_rules)?;
        let publisher = connector
            .connect()
            .map_err(|e| SinkError::build("kafka", route.clone(), e))?;

        tracing::debug!(
            route = %route,
            brokers = %config.brokers,
            topic = %config.topic,
            match_rules = matcher.len(),
            serializer = serializer.format().as_str(),
            async_publish = config.async_publish,
            "queue sink built"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                logger: RateLimitedLogger::new(route.clone(), DEFAULT_LOG_INTERVAL),
                route,
                topic,
                matcher,
                serializer,
                connector,
                publisher: RwLock::new(publisher),
                retry: config.retry.clone(),
                async_publish: config.async_publish,
                metrics,
            }),
            tracker: TaskTracker::new(),
        })
    }

    /// Route this sink belongs to
    pub fn route(&self) -> &str {
        &self.inner.route
    }
}

impl Inner {
    /// Apply the match list, render topics and serialize every sample
    fn encode(&self, series: &[Series]) -> TopicBatches {
        let mut batches = TopicBatches::new();

        for s in series {
            if !self.matcher.matches(s) {
                self.metrics.filtered.add(&self.route, s.samples.len() as u64);
                continue;
            }

            let labels = s.label_map();
            let topic = match self.topic.render(&labels) {
                Ok(topic) if !topic.is_empty() => topic,
                Ok(_) => {
                    self.metrics.topic_errors.inc(&self.route);
                    self.logger
                        .warn("topic template rendered an empty topic, series dropped", &self.topic.source());
                    continue;
                }
                Err(e) => {
                    self.metrics.topic_errors.inc(&self.route);
                    self.logger.warn("topic template failed, series dropped", &e);
                    continue;
                }
            };

            let name = s.metric_name();
            for sample in &s.samples {
                let encoded = MetricRecord::new(name, &labels, sample)
                    .and_then(|record| self.serializer.serialize(&record));
                match encoded {
                    Ok(payload) => {
                        self.metrics.serialized.inc(&self.route);
                        batches.entry(topic.clone()).or_default().push(payload);
                    }
                    Err(e) => {
                        self.metrics.serialize_failed.inc(&self.route);
                        self.logger.warn("sample serialization failed, dropped", &e);
                    }
                }
            }
        }

        batches
    }

    /// Publish every topic batch concurrently
    async fn publish_all(&self, batches: TopicBatches) -> Result<()> {
        let total = batches.len();
        let results = join_all(
            batches
                .into_iter()
                .map(|(topic, payloads)| async move { self.publish_with_retry(&topic, payloads).await }),
        )
        .await;

        let mut failed = 0;
        let mut last_error = None;
        for result in results {
            if let Err(e) = result {
                failed += 1;
                last_error = Some(e);
            }
        }

        match last_error {
            None => Ok(()),
            Some(e) if total == 1 => Err(e),
            Some(e) => Err(SinkError::PartialPublish {
                failed,
                total,
                last_error: e.to_string(),
            }),
        }
    }

    /// Publish one topic batch under the retry policy
    ///
    /// Transient failures back off and retry, unknown failures recreate the
    /// publisher and retry, anything else stops at once.
    async fn publish_with_retry(&self, topic: &str, payloads: Vec<Vec<u8>>) -> Result<()> {
        let attempts = self.retry.attempts.max(1);
        let count = payloads.len() as u64;
        let mut made = 0;
        let mut last_error: Option<PublishError> = None;

        while made < attempts {
            made += 1;
            let publisher = Arc::clone(&*self.publisher.read());

            let err = match self.attempt(publisher.as_ref(), topic, &payloads).await {
                Ok(()) => {
                    self.metrics.written.add(&self.route, count);
                    return Ok(());
                }
                Err(e) => e,
            };

            tracing::debug!(
                route = %self.route,
                topic = %topic,
                attempt = made,
                class = err.class.as_str(),
                error = %err,
                "publish attempt failed"
            );

            let class = err.class;
            last_error = Some(err);
            match class {
                ErrorClass::Transient => {
                    if made < attempts && !self.retry.backoff.is_zero() {
                        tokio::time::sleep(self.retry.backoff).await;
                    }
                }
                ErrorClass::Unknown => self.reconnect(),
                ErrorClass::Fatal => break,
            }
        }

        self.metrics.failed.add(&self.route, count);
        let last_error = last_error.map(|e| e.to_string()).unwrap_or_default();
        tracing::warn!(
            route = %self.route,
            topic = %topic,
            attempts = made,
            messages = count,
            error = %last_error,
            "publish failed, messages dropped"
        );
        Err(SinkError::RetriesExhausted {
            topic: topic.to_string(),
            attempts: made,
            last_error,
        })
    }

    /// One publish bounded by the per-attempt timeout
    async fn attempt(
        &self,
        publisher: &dyn Publisher,
        topic: &str,
        payloads: &[Vec<u8>],
    ) -> std::result::Result<(), PublishError> {
        let limit = self.retry.attempt_timeout;
        if limit.is_zero() {
            return publisher.publish(topic, payloads).await;
        }
        match tokio::time::timeout(limit, publisher.publish(topic, payloads)).await {
            Ok(result) => result,
            Err(_) => Err(PublishError::transient(format!(
                "publish attempt timed out after {:?}",
                limit
            ))),
        }
    }

    /// Replace the publisher; keeps the old one if creation fails
    fn reconnect(&self) {
        match self.connector.connect() {
            Ok(publisher) => {
                *self.publisher.write() = publisher;
                self.metrics.reconnects.inc(&self.route);
                tracing::info!(route = %self.route, "queue producer recreated");
            }
            Err(e) => {
                tracing::warn!(route = %self.route, error = %e, "failed to recreate queue producer");
            }
        }
    }
}

#[async_trait]
impl Sink for QueueSink {
    fn kind(&self) -> &'static str {
        "kafka"
    }

    async fn store(&self, series: Vec<Series>) -> Result<StoreStatus> {
        let inner = &self.inner;
        inner.metrics.batches.inc(&inner.route);

        let batches = inner.encode(&series);
        if batches.is_empty() {
            return Ok(StoreStatus::Empty);
        }

        if inner.async_publish {
            let inner = Arc::clone(&self.inner);
            self.tracker.spawn(async move {
                if let Err(e) = inner.publish_all(batches).await {
                    inner.logger.error("async publish failed", &e);
                }
            });
            return Ok(StoreStatus::Dispatched { tasks: 1 });
        }

        inner.publish_all(batches).await?;
        Ok(StoreStatus::Delivered)
    }

    async fn drain(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }
}
