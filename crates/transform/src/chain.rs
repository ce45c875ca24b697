//! RelabelChain - ordered relabel rules acting as a route filter
//!
//! The chain never touches the caller's series. Each evaluation works on a
//! private label map, so a batch shared by concurrent routes stays intact.
//! A series survives when no rule drops it and its final label set is not
//! empty; survivors are forwarded with their original labels.

use sroute_config::RelabelRuleConfig;
use sroute_protocol::{Batch, Label, Series};

use crate::error::TransformResult;
use crate::rule::{LabelSet, RelabelRule};

#[cfg(test)]
#[path = "chain_test.rs"]
mod tests;

/// Outcome of filtering a batch for one route
#[derive(Debug, Default)]
pub struct FilterOutcome {
    /// Route-local copies of the surviving series, in batch order
    pub kept: Vec<Series>,
    /// Number of series the chain dropped
    pub dropped: usize,
}

/// Ordered relabel rules applied to every series of a batch
#[derive(Debug, Clone, Default)]
pub struct RelabelChain {
    rules: Vec<RelabelRule>,
}

impl RelabelChain {
    /// Compile a chain from config, failing on the first bad rule
    pub fn compile(configs: &[RelabelRuleConfig]) -> TransformResult<Self> {
        let rules = configs
            .iter()
            .enumerate()
            .map(|(index, config)| RelabelRule::compile(index, config))
            .collect::<TransformResult<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Chain with no rules; keeps every labelled series
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of rules
    #[inline]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the chain has no rules
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run the chain over a label list
    ///
    /// Returns the relabelled set, or `None` when the series is dropped.
    pub fn process(&self, labels: &[Label]) -> Option<LabelSet> {
        let mut set: LabelSet = labels
            .iter()
            .map(|l| (l.name.clone(), l.value.clone()))
            .collect();

        for rule in &self.rules {
            if !rule.apply(&mut set) {
                return None;
            }
        }

        if set.is_empty() { None } else { Some(set) }
    }

    /// Keep/drop decision for one series
    pub fn keep(&self, series: &Series) -> bool {
        if self.rules.is_empty() {
            return !series.has_no_labels();
        }
        self.process(&series.labels).is_some()
    }

    /// Filter a shared batch into route-local copies
    pub fn filter(&self, batch: &Batch) -> FilterOutcome {
        let mut outcome = FilterOutcome {
            kept: Vec::with_capacity(batch.len()),
            dropped: 0,
        };
        for series in batch.iter() {
            if self.keep(series) {
                outcome.kept.push(series.clone());
            } else {
                outcome.dropped += 1;
            }
        }
        outcome
    }
}
