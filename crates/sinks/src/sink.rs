//! Sink trait

use async_trait::async_trait;
use sroute_protocol::Series;

use crate::Result;

/// Outcome of a successful `store` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    /// Nothing was left to deliver
    Empty,
    /// Delivery finished before `store` returned
    Delivered,
    /// Delivery was handed to detached tasks; failures surface in counters
    Dispatched {
        /// Number of detached deliveries started
        tasks: usize,
    },
}

/// A delivery destination owned by one route
///
/// `store` receives a route-local copy of the series; the sink may mutate
/// and consume it freely.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Short sink type name for logs and metrics
    fn kind(&self) -> &'static str;

    /// Deliver `series`
    async fn store(&self, series: Vec<Series>) -> Result<StoreStatus>;

    /// Wait for detached deliveries started by `store` to finish
    async fn drain(&self) {}
}
