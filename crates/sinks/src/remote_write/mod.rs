//! Remote-write cluster sink
//!
//! Series are placed with a `ShardTable`: a virtual shard from the full
//! label hash (appended as `stream_task_id`) and a node from either the same
//! hash or the hash of the configured affinity labels. Each node's batch is
//! encoded as a snappy-compressed protobuf `WriteRequest` and POSTed on its
//! own task.

mod cluster;
mod metrics;
mod writer;

pub use cluster::ClusterSink;
pub use metrics::RemoteWriteMetrics;
pub use writer::{
    DEFAULT_TIMEOUT, EndpointWriter, MAX_ERROR_BODY_LENGTH, REMOTE_WRITE_VERSION_HEADER,
    user_agent,
};

#[cfg(test)]
#[path = "remote_write_test.rs"]
mod tests;
