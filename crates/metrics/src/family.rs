//! MetricFamily - one named metric with its samples

use crate::{Counter, CounterVec, Gauge};

/// Prometheus metric type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Monotonic counter
    Counter,
    /// Point-in-time value
    Gauge,
}

impl MetricKind {
    /// `# TYPE` keyword
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Counter => "counter",
            Self::Gauge => "gauge",
        }
    }
}

/// One labelled value
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    /// `(name, value)` label pairs
    pub labels: Vec<(&'static str, String)>,
    /// Sample value
    pub value: f64,
}

/// A named metric, unprefixed, with all its current samples
#[derive(Debug, Clone, PartialEq)]
pub struct MetricFamily {
    /// Name without the global prefix, e.g. `router_batches_total`
    pub name: &'static str,
    /// `# HELP` text
    pub help: &'static str,
    /// Metric type
    pub kind: MetricKind,
    /// Samples; an empty list renders only HELP and TYPE
    pub samples: Vec<MetricSample>,
}

impl MetricFamily {
    /// Unlabelled counter family
    pub fn counter(name: &'static str, help: &'static str, counter: &Counter) -> Self {
        Self {
            name,
            help,
            kind: MetricKind::Counter,
            samples: vec![MetricSample {
                labels: Vec::new(),
                value: counter.get() as f64,
            }],
        }
    }

    /// Unlabelled gauge family
    pub fn gauge(name: &'static str, help: &'static str, gauge: &Gauge) -> Self {
        Self {
            name,
            help,
            kind: MetricKind::Gauge,
            samples: vec![MetricSample {
                labels: Vec::new(),
                value: gauge.get() as f64,
            }],
        }
    }

    /// Counter family with one sample per child of `vec`
    pub fn counter_vec(name: &'static str, help: &'static str, vec: &CounterVec) -> Self {
        let label = vec.label();
        Self {
            name,
            help,
            kind: MetricKind::Counter,
            samples: vec
                .snapshot()
                .into_iter()
                .map(|(value, count)| MetricSample {
                    labels: vec![(label, value)],
                    value: count as f64,
                })
                .collect(),
        }
    }
}
