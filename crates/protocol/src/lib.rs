//! sroute Protocol - Core types for the metrics relay
//!
//! This crate provides the foundational types that flow through the relay:
//! - `Label` / `Sample` / `Series` - one time series as decoded from a
//!   remote-write request (protobuf message derives)
//! - `Batch` - the series of one inbound request, shared read-only by routes
//! - `WriteRequest` - the remote-write envelope
//! - `encode_write_request` / `decode_write_request` - protobuf + snappy codec
//!
//! # Design Principles
//!
//! - **Shared, immutable batches**: `Batch` wraps its series in an `Arc` so
//!   fan-out to N routes is N reference-count bumps, not N copies
//! - **Copy on write for routing metadata**: sinks that append labels work on
//!   their own `Series` values, never on the shared batch
//!
//! # Wire Format
//!
//! ```text
//! POST body = snappy_block( protobuf( WriteRequest { timeseries: [Series] } ) )
//! ```

mod batch;
mod error;
mod series;
mod wire;

pub use batch::Batch;
pub use error::ProtocolError;
pub use series::{Label, Sample, Series};
pub use wire::{WriteRequest, decode_write_request, encode_write_request};

// Re-export bytes for convenience
pub use bytes::Bytes;

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Reserved label carrying the metric name
pub const METRIC_NAME_LABEL: &str = "__name__";

/// Synthetic label appended by cluster sharding (virtual shard index)
pub const SHARD_LABEL: &str = "stream_task_id";

/// Remote-write protocol version advertised on outbound requests
pub const REMOTE_WRITE_VERSION: &str = "0.1.0";
