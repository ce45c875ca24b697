//! JSON metrics formatter
//!
//! # Example Output
//!
//! ```json
//! {"type":"metrics","component":"router","values":{"batches_total":120.0},"deltas":{"batches_total":12.0}}
//! ```

use super::MetricsFormatter;
use crate::ComponentSnapshot;
use serde::Serialize;
use std::collections::BTreeMap;

/// JSON metrics formatter
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new() -> Self {
        Self
    }
}

#[derive(Serialize)]
struct ComponentJson<'a> {
    #[serde(rename = "type")]
    report_type: &'static str,
    component: &'a str,
    values: &'a BTreeMap<String, f64>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    deltas: BTreeMap<&'a str, f64>,
}

impl MetricsFormatter for JsonFormatter {
    fn format_component(
        &self,
        current: &ComponentSnapshot,
        previous: Option<&ComponentSnapshot>,
    ) -> String {
        let deltas = current
            .values
            .keys()
            .filter_map(|key| {
                current
                    .delta(key, previous)
                    .map(|delta| (key.as_str(), delta))
            })
            .collect();

        let json = ComponentJson {
            report_type: "metrics",
            component: current.component,
            values: &current.values,
            deltas,
        };

        serde_json::to_string(&json).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CounterVec, MetricFamily};

    #[test]
    fn test_json_shape() {
        let family = CounterVec::new("route");
        family.add("a", 3);
        let previous = ComponentSnapshot::from_families(
            "queue",
            &[MetricFamily::counter_vec("queue_written_total", "", &family)],
        );
        family.add("a", 2);
        let current = ComponentSnapshot::from_families(
            "queue",
            &[MetricFamily::counter_vec("queue_written_total", "", &family)],
        );

        let out = JsonFormatter::new().format_component(&current, Some(&previous));
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["type"], "metrics");
        assert_eq!(parsed["component"], "queue");
        assert_eq!(parsed["values"]["written_total{route=a}"], 5.0);
        assert_eq!(parsed["deltas"]["written_total{route=a}"], 2.0);
    }

    #[test]
    fn test_json_without_previous_omits_deltas() {
        let current = ComponentSnapshot::from_families("router", &[]);
        let out = JsonFormatter::new().format_component(&current, None);
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!(parsed.get("deltas").is_none());
    }
}
