//! Metrics provider trait
//!
//! Each component exposes its counters through a handle implementing
//! `MetricsProvider`, so the registry and the reporter never see concrete
//! metric structs.

use crate::MetricFamily;

/// Source of metric families for one component
pub trait MetricsProvider: Send + Sync {
    /// Component name used in log reports (e.g. "router", "queue")
    fn component(&self) -> &'static str;

    /// Current values of every family this component owns
    fn families(&self) -> Vec<MetricFamily>;
}
