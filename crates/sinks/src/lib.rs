//! Sroute Sinks - Delivery destinations for routed series
//!
//! Every route owns exactly one sink. The router hands each sink the series
//! that survived the route's relabel chain; the sink delivers them on its own
//! and reports failures through counters and logs only.
//!
//! # Sinks
//!
//! - **remote_write**: sharded Prometheus remote-write cluster. Series are
//!   hashed onto a virtual shard (`stream_task_id`) and a node, and each
//!   populated node gets its own detached HTTP delivery.
//! - **queue**: Kafka. One message per sample, addressed to a topic rendered
//!   from a template over the series labels, with bounded retry and
//!   producer recreation on broker-level failures.
//!
//! # Example
//!
//! ```ignore
//! use sroute_sinks::{SinkFactory, Sink};
//!
//! let factory = SinkFactory::new(remote_write_metrics, queue_metrics, serializer);
//! let sink = factory.build("cluster-a", &route.upstream)?;
//! sink.store(series).await?;
//! ```

// =============================================================================
// Sink trait and shared types
// =============================================================================

mod error;
mod factory;
mod sink;

pub use error::{Result, SinkError};
pub use factory::SinkFactory;
pub use sink::{Sink, StoreStatus};

// =============================================================================
// Sink implementations
// =============================================================================

/// Sharded HTTP remote-write cluster
pub mod remote_write;

/// Kafka queue with topic templates and pluggable serializers
pub mod queue;

// =============================================================================
// Utilities
// =============================================================================

/// Shared helpers for sink implementations
pub mod util;
