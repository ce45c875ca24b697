//! Registry - Prometheus text exposition
//!
//! Renders every registered provider in the text exposition format:
//!
//! ```text
//! # HELP sroute_router_batches_total Batches handed to the router.
//! # TYPE sroute_router_batches_total counter
//! sroute_router_batches_total 42
//! ```

use crate::{MetricFamily, MetricsProvider};
use std::fmt::Write;
use std::sync::Arc;

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;

/// Fixed set of providers rendered under a common prefix
#[derive(Clone, Default)]
pub struct Registry {
    prefix: String,
    providers: Vec<Arc<dyn MetricsProvider>>,
}

impl Registry {
    /// Create an empty registry; `prefix` may be empty
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            providers: Vec::new(),
        }
    }

    /// Add a provider
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn MetricsProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Metric name prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Registered providers
    pub fn providers(&self) -> &[Arc<dyn MetricsProvider>] {
        &self.providers
    }

    /// Full exposed name for `name`
    pub fn metric_name(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}_{}", self.prefix, name)
        }
    }

    /// Render all providers as Prometheus text
    pub fn render(&self) -> String {
        let mut out = String::new();
        for provider in &self.providers {
            for family in provider.families() {
                self.render_family(&mut out, &family);
            }
        }
        out
    }

    fn render_family(&self, out: &mut String, family: &MetricFamily) {
        let name = self.metric_name(family.name);
        let _ = writeln!(out, "# HELP {} {}", name, family.help);
        let _ = writeln!(out, "# TYPE {} {}", name, family.kind.as_str());

        for sample in &family.samples {
            out.push_str(&name);
            if !sample.labels.is_empty() {
                out.push('{');
                for (i, (label, value)) in sample.labels.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    let _ = write!(out, "{}=\"{}\"", label, escape_label_value(value));
                }
                out.push('}');
            }
            let _ = writeln!(out, " {}", sample.value);
        }
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("prefix", &self.prefix)
            .field("providers", &self.providers.len())
            .finish()
    }
}

/// Escape `\`, `"` and newlines in a label value
fn escape_label_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            c => escaped.push(c),
        }
    }
    escaped
}
