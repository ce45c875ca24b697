//! Kafka queue sink
//!
//! For each series the topic is rendered from a template over its labels,
//! then each sample that passes the match list becomes one value-only
//! message. Messages are grouped by topic and each topic batch is published
//! under a bounded retry policy:
//!
//! - transient errors (leader unavailable, timeouts) back off and retry
//! - unknown errors (all brokers down, transport failure) recreate the
//!   producer and retry
//! - anything else gives up immediately
//!
//! After the last attempt the messages are counted as failed and dropped.

mod avro;
mod kafka;
mod matcher;
mod metrics;
mod publisher;
mod record;
mod serializer;
mod sink;
mod topic;

pub use avro::AvroSchema;
pub use kafka::{KafkaConnector, KafkaPublisher, classify, client_config, partitioner};
pub use matcher::MatchRules;
pub use metrics::QueueMetrics;
pub use publisher::{Connector, ErrorClass, PublishError, Publisher};
pub use record::{MetricRecord, format_timestamp, format_value};
pub use serializer::{AvroJsonSerializer, JsonSerializer, Serializer, from_config as serializer_from_config};
pub use sink::QueueSink;
pub use topic::TopicTemplate;

#[cfg(test)]
#[path = "queue_test.rs"]
mod tests;
