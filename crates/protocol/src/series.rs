//! Series - one labelled time series with its samples
//!
//! The structs double as protobuf messages (`prost` derives) matching the
//! Prometheus remote-write schema:
//!
//! ```text
//! message Label      { string name = 1; string value = 2; }
//! message Sample     { double value = 1; int64 timestamp = 2; }
//! message TimeSeries { repeated Label labels = 1; repeated Sample samples = 2; }
//! ```

use std::collections::BTreeMap;

use crate::METRIC_NAME_LABEL;

/// A single `name="value"` pair
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Message)]
pub struct Label {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub value: String,
}

impl Label {
    /// Create a new label
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A single observation: value at a millisecond timestamp
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Sample {
    #[prost(double, tag = "1")]
    pub value: f64,
    /// Milliseconds since the Unix epoch
    #[prost(int64, tag = "2")]
    pub timestamp: i64,
}

impl Sample {
    /// Create a new sample
    pub fn new(value: f64, timestamp: i64) -> Self {
        Self { value, timestamp }
    }
}

/// A label set plus its ordered samples
///
/// Label names are unique within a series. Sample order is preserved through
/// every delivery path.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Series {
    #[prost(message, repeated, tag = "1")]
    pub labels: Vec<Label>,
    #[prost(message, repeated, tag = "2")]
    pub samples: Vec<Sample>,
}

impl Series {
    /// Create a series from labels and samples
    pub fn from_parts(labels: Vec<Label>, samples: Vec<Sample>) -> Self {
        Self { labels, samples }
    }

    /// Build a series from `(name, value)` pairs with no samples
    pub fn from_pairs<N, V>(pairs: impl IntoIterator<Item = (N, V)>) -> Self
    where
        N: Into<String>,
        V: Into<String>,
    {
        Self {
            labels: pairs.into_iter().map(|(n, v)| Label::new(n, v)).collect(),
            samples: Vec::new(),
        }
    }

    /// Append a sample (builder style)
    #[must_use]
    pub fn with_sample(mut self, value: f64, timestamp: i64) -> Self {
        self.samples.push(Sample::new(value, timestamp));
        self
    }

    /// Look up a label value by name
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|l| l.name == name)
            .map(|l| l.value.as_str())
    }

    /// Metric name (`__name__`), empty if absent
    pub fn metric_name(&self) -> &str {
        self.label(METRIC_NAME_LABEL).unwrap_or("")
    }

    /// Append a label to this series
    ///
    /// Only call this on a series the caller owns. Shared batch series must be
    /// cloned first.
    pub fn push_label(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.labels.push(Label::new(name, value));
    }

    /// Labels as an ordered name -> value map
    ///
    /// Later duplicates win, matching map semantics.
    pub fn label_map(&self) -> BTreeMap<String, String> {
        self.labels
            .iter()
            .map(|l| (l.name.clone(), l.value.clone()))
            .collect()
    }

    /// Number of samples in this series
    #[inline]
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Whether the series has no labels
    #[inline]
    pub fn has_no_labels(&self) -> bool {
        self.labels.is_empty()
    }
}
