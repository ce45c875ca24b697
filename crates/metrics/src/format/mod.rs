//! Metrics output formatters
//!
//! Formats a snapshot for the periodic log report.

mod human;
mod json;

pub use human::HumanFormatter;
pub use json::JsonFormatter;

use crate::ComponentSnapshot;

/// Trait for metrics formatters
pub trait MetricsFormatter: Send + Sync {
    /// Format one component, with deltas against `previous` when known
    fn format_component(
        &self,
        current: &ComponentSnapshot,
        previous: Option<&ComponentSnapshot>,
    ) -> String;
}

/// Format count with K/M suffix for readability
pub fn format_count(count: f64) -> String {
    const K: f64 = 1000.0;
    const M: f64 = 1_000_000.0;

    if count.abs() >= M {
        format!("{:.1}M", count / M)
    } else if count.abs() >= K {
        format!("{:.1}K", count / K)
    } else {
        format!("{count:.0}")
    }
}
