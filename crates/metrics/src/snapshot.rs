//! Point-in-time view of every provider, used by the log reporter

use crate::{MetricFamily, MetricKind, MetricsProvider};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

/// Values of one component keyed by series name
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentSnapshot {
    /// Component name
    pub component: &'static str,
    /// `name` or `name{label=value}` -> value; the component prefix is stripped
    pub values: BTreeMap<String, f64>,
    /// Keys that are gauges; no delta is computed for them
    pub gauges: Vec<String>,
}

impl ComponentSnapshot {
    /// Build from a provider's families
    pub fn from_families(component: &'static str, families: &[MetricFamily]) -> Self {
        let mut values = BTreeMap::new();
        let mut gauges = Vec::new();
        for family in families {
            let short = family
                .name
                .strip_prefix(component)
                .and_then(|n| n.strip_prefix('_'))
                .unwrap_or(family.name);
            for sample in &family.samples {
                let key = if sample.labels.is_empty() {
                    short.to_string()
                } else {
                    let labels: Vec<String> = sample
                        .labels
                        .iter()
                        .map(|(k, v)| format!("{k}={v}"))
                        .collect();
                    format!("{short}{{{}}}", labels.join(","))
                };
                if family.kind == MetricKind::Gauge {
                    gauges.push(key.clone());
                }
                values.insert(key, sample.value);
            }
        }
        Self {
            component,
            values,
            gauges,
        }
    }

    /// Whether `key` is a gauge
    pub fn is_gauge(&self, key: &str) -> bool {
        self.gauges.iter().any(|g| g == key)
    }

    /// Counter increase since `previous`, absent keys count from zero
    pub fn delta(&self, key: &str, previous: Option<&ComponentSnapshot>) -> Option<f64> {
        if self.is_gauge(key) {
            return None;
        }
        let previous = previous?;
        let now = self.values.get(key).copied().unwrap_or(0.0);
        let before = previous.values.get(key).copied().unwrap_or(0.0);
        Some(now - before)
    }
}

/// All components at one instant
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// When the snapshot was taken
    pub taken_at: Instant,
    /// One entry per provider, in registration order
    pub components: Vec<ComponentSnapshot>,
}

impl Snapshot {
    /// Collect from providers
    pub fn collect(providers: &[Arc<dyn MetricsProvider>]) -> Self {
        Self {
            taken_at: Instant::now(),
            components: providers
                .iter()
                .map(|p| ComponentSnapshot::from_families(p.component(), &p.families()))
                .collect(),
        }
    }

    /// Find a component by name
    pub fn component(&self, name: &str) -> Option<&ComponentSnapshot> {
        self.components.iter().find(|c| c.component == name)
    }
}
