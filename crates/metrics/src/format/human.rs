//! Human-readable metrics formatter
//!
//! # Example Output
//!
//! ```text
//! [metrics] router: batches_total 1.2K (+40) | inflight 2 | series_total{route=a} 9.1K (+300)
//! [metrics] queue: written_total{route=k} 4.0K (+120)
//! ```

use super::{MetricsFormatter, format_count};
use crate::ComponentSnapshot;
use std::fmt::Write;

/// Human-readable metrics formatter
#[derive(Debug, Clone, Default)]
pub struct HumanFormatter;

impl HumanFormatter {
    /// Create a new human formatter
    pub fn new() -> Self {
        Self
    }
}

impl MetricsFormatter for HumanFormatter {
    fn format_component(
        &self,
        current: &ComponentSnapshot,
        previous: Option<&ComponentSnapshot>,
    ) -> String {
        let mut output = format!("[metrics] {}:", current.component);

        if current.values.is_empty() {
            output.push_str(" idle");
            return output;
        }

        for (i, (key, value)) in current.values.iter().enumerate() {
            if i > 0 {
                output.push_str(" |");
            }
            let _ = write!(output, " {} {}", key, format_count(*value));
            if let Some(delta) = current.delta(key, previous) {
                let _ = write!(output, " (+{})", format_count(delta));
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Counter, Gauge, MetricFamily};

    fn snapshot(batches: u64, inflight: i64) -> ComponentSnapshot {
        let counter = Counter::new();
        counter.add(batches);
        let gauge = Gauge::new();
        gauge.set(inflight);
        ComponentSnapshot::from_families(
            "router",
            &[
                MetricFamily::counter("router_batches_total", "", &counter),
                MetricFamily::gauge("router_inflight", "", &gauge),
            ],
        )
    }

    #[test]
    fn test_first_report_has_no_deltas() {
        let out = HumanFormatter::new().format_component(&snapshot(1500, 2), None);
        assert_eq!(out, "[metrics] router: batches_total 1.5K | inflight 2");
    }

    #[test]
    fn test_deltas_skip_gauges() {
        let previous = snapshot(100, 5);
        let out = HumanFormatter::new().format_component(&snapshot(140, 1), Some(&previous));
        assert_eq!(out, "[metrics] router: batches_total 140 (+40) | inflight 1");
    }

    #[test]
    fn test_idle_component() {
        let empty = ComponentSnapshot::from_families("queue", &[]);
        let out = HumanFormatter::new().format_component(&empty, None);
        assert_eq!(out, "[metrics] queue: idle");
    }
}
