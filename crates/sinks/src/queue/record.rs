//! MetricRecord - one queue message per sample

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat};
use serde::Serialize;
use sroute_protocol::Sample;

use crate::{Result, SinkError};

/// Message body published for a single sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRecord {
    /// RFC 3339 UTC, second precision
    pub timestamp: String,
    /// Shortest decimal form; `NaN`, `+Inf` or `-Inf` for specials
    pub value: String,
    /// Metric name (`__name__`)
    pub name: String,
    /// Full label set, `__name__` included
    pub labels: BTreeMap<String, String>,
}

impl MetricRecord {
    /// Build the record for `sample` of a series with `labels`
    pub fn new(name: &str, labels: &BTreeMap<String, String>, sample: &Sample) -> Result<Self> {
        Ok(Self {
            timestamp: format_timestamp(sample.timestamp)?,
            value: format_value(sample.value),
            name: name.to_string(),
            labels: labels.clone(),
        })
    }
}

/// Millisecond epoch timestamp as RFC 3339 seconds in UTC
pub fn format_timestamp(millis: i64) -> Result<String> {
    let seconds = millis.div_euclid(1000);
    DateTime::from_timestamp(seconds, 0)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
        .ok_or_else(|| SinkError::Serialize(format!("timestamp {} out of range", millis)))
}

/// Sample value in its shortest round-trip decimal form
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "+Inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        value.to_string()
    }
}
