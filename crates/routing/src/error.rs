//! Routing error types

use thiserror::Error;

/// Result type for routing operations
pub type Result<T> = std::result::Result<T, RoutingError>;

/// Errors that can occur when building a shard table
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoutingError {
    /// A cluster needs at least one endpoint
    #[error("shard table needs at least one endpoint")]
    NoEndpoints,
}
