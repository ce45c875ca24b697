//! sroute - Metrics
//!
//! Internal counters, Prometheus text exposition and periodic log reports.
//!
//! # Overview
//!
//! This crate provides:
//! - Lock-free `Counter` and `Gauge` primitives
//! - `CounterVec`, a counter family keyed by one label (route, endpoint)
//! - `MetricsProvider`, implemented by each component's metrics handle
//! - `Registry`, which renders every provider as Prometheus text under a prefix
//! - `Reporter`, which logs a summary at a fixed interval (human or JSON)
//!
//! # Metrics Handle Pattern
//!
//! Components keep an `Arc<...Metrics>` and the binary registers the same
//! `Arc` with the registry once at startup. Handles outlive route rebuilds,
//! so counters never reset on reload.
//!
//! ```text
//! ReceiveMetrics ─┐
//! RouterMetrics  ─┼──► Registry ──► GET /metrics
//! QueueMetrics   ─┘        └──────► Reporter ──► tracing::info!
//! ```

mod family;
pub mod format;
mod provider;
mod registry;
mod reporter;
mod snapshot;


pub use family::{MetricFamily, MetricKind, MetricSample};
pub use format::{HumanFormatter, JsonFormatter, MetricsFormatter};
pub use provider::MetricsProvider;
pub use registry::Registry;
pub use reporter::{Reporter, ReporterBuilder};
pub use snapshot::{ComponentSnapshot, Snapshot};

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// Atomic counter wrapper for convenient metric operations
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    /// Create a new counter initialized to 0
    #[inline]
    pub const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    /// Increment the counter by `val` (relaxed ordering for performance)
    #[inline]
    pub fn add(&self, val: u64) {
        self.0.fetch_add(val, Ordering::Relaxed);
    }

    /// Increment the counter by 1
    #[inline]
    pub fn inc(&self) {
        self.add(1);
    }

    /// Get the current value (relaxed ordering)
    #[inline]
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Signed gauge for values that go up and down
#[derive(Debug, Default)]
pub struct Gauge(AtomicI64);

impl Gauge {
    /// Create a new gauge initialized to 0
    #[inline]
    pub const fn new() -> Self {
        Self(AtomicI64::new(0))
    }

    /// Overwrite the value
    #[inline]
    pub fn set(&self, val: i64) {
        self.0.store(val, Ordering::Relaxed);
    }

    /// Add 1
    #[inline]
    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    /// Subtract 1
    #[inline]
    pub fn dec(&self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }

    /// Current value
    #[inline]
    pub fn get(&self) -> i64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Counters keyed by the value of a single label
///
/// Children are created on first use and never removed, so a handle taken
/// with `with` stays valid for the life of the process.
#[derive(Debug)]
pub struct CounterVec {
    label: &'static str,
    children: RwLock<BTreeMap<String, Arc<Counter>>>,
}

impl CounterVec {
    /// Create an empty family keyed by `label`
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            children: RwLock::new(BTreeMap::new()),
        }
    }

    /// Label name of this family
    #[inline]
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Get or create the child counter for `value`
    pub fn with(&self, value: &str) -> Arc<Counter> {
        if let Some(counter) = self.children.read().get(value) {
            return Arc::clone(counter);
        }
        let mut children = self.children.write();
        Arc::clone(children.entry(value.to_string()).or_default())
    }

    /// Increment the child for `value` by 1
    #[inline]
    pub fn inc(&self, value: &str) {
        self.with(value).inc();
    }

    /// Increment the child for `value` by `val`
    #[inline]
    pub fn add(&self, value: &str, val: u64) {
        self.with(value).add(val);
    }

    /// Current value for `value`, 0 if never touched
    pub fn get(&self, value: &str) -> u64 {
        self.children.read().get(value).map_or(0, |c| c.get())
    }

    /// Sum across all children
    pub fn total(&self) -> u64 {
        self.children.read().values().map(|c| c.get()).sum()
    }

    /// `(label value, count)` pairs sorted by label value
    pub fn snapshot(&self) -> Vec<(String, u64)> {
        self.children
            .read()
            .iter()
            .map(|(k, c)| (k.clone(), c.get()))
            .collect()
    }
}
