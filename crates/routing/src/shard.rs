//! ShardTable - series placement across cluster endpoints

use sroute_protocol::{Label, SHARD_LABEL, Series};

use crate::error::{Result, RoutingError};
use crate::hash::{hash_mod, label_hash};

/// Where a single series goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Virtual shard (`stream_task_id`), absent for single-endpoint tables
    pub shard: Option<usize>,
    /// Endpoint index, always `< endpoint_count`
    pub node: usize,
}

/// Series grouped per endpoint
#[derive(Debug, Default)]
pub struct Partition {
    /// `shards[node]` holds the series placed on that endpoint
    pub shards: Vec<Vec<Series>>,
    /// Series skipped because they carry no labels
    pub invalid: usize,
}

impl Partition {
    /// Iterate over non-empty shards as `(node, series)`
    pub fn populated(self) -> impl Iterator<Item = (usize, Vec<Series>)> {
        self.shards
            .into_iter()
            .enumerate()
            .filter(|(_, series)| !series.is_empty())
    }

    /// Total series placed across all endpoints
    pub fn placed(&self) -> usize {
        self.shards.iter().map(Vec::len).sum()
    }
}

/// Placement rules for one cluster
///
/// Immutable after construction; shared freely between concurrent stores.
#[derive(Debug, Clone)]
pub struct ShardTable {
    endpoint_count: usize,
    dimension: usize,
    filter_labels: Vec<String>,
}

impl ShardTable {
    /// Build a table for `endpoint_count` endpoints
    ///
    /// `dimension` is the virtual shard count and may exceed the endpoint
    /// count; values `<= 1` collapse every series into shard 0.
    /// `filter_labels` selects the label subset used for node affinity.
    ///
    /// # Errors
    ///
    /// Returns `RoutingError::NoEndpoints` when `endpoint_count` is zero.
    pub fn new(endpoint_count: usize, dimension: usize, filter_labels: Vec<String>) -> Result<Self> {
        if endpoint_count == 0 {
            return Err(RoutingError::NoEndpoints);
        }
        Ok(Self {
            endpoint_count,
            dimension,
            filter_labels,
        })
    }

    /// Number of endpoints
    #[inline]
    pub fn endpoint_count(&self) -> usize {
        self.endpoint_count
    }

    /// Virtual shard count
    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Labels used for node affinity
    pub fn filter_labels(&self) -> &[String] {
        &self.filter_labels
    }

    /// Compute the placement for a series without modifying it
    ///
    /// Returns `None` for a series with no labels.
    pub fn assign(&self, series: &Series) -> Option<Placement> {
        if series.has_no_labels() {
            return None;
        }
        if self.endpoint_count == 1 {
            return Some(Placement {
                shard: None,
                node: 0,
            });
        }

        let hash = label_hash(&series.labels);
        let shard = hash_mod(self.dimension, hash);
        let node_hash = if self.filter_labels.is_empty() {
            hash
        } else {
            let shard_label = Label::new(SHARD_LABEL, shard.to_string());
            label_hash(&self.affinity_labels(series, &shard_label))
        };

        Some(Placement {
            shard: Some(shard),
            node: hash_mod(self.endpoint_count, node_hash),
        })
    }

    /// Place an owned series, appending `stream_task_id` when sharded
    pub fn place(&self, mut series: Series) -> Option<(usize, Series)> {
        let placement = self.assign(&series)?;
        if let Some(shard) = placement.shard {
            series.push_label(SHARD_LABEL, shard.to_string());
        }
        Some((placement.node, series))
    }

    /// Group owned series by endpoint
    pub fn partition(&self, series: Vec<Series>) -> Partition {
        let mut partition = Partition {
            shards: vec![Vec::new(); self.endpoint_count],
            invalid: 0,
        };

        for s in series {
            match self.place(s) {
                Some((node, placed)) => match partition.shards.get_mut(node) {
                    Some(bucket) => bucket.push(placed),
                    None => partition.invalid += 1,
                },
                None => partition.invalid += 1,
            }
        }

        partition
    }

    /// Pick the affinity labels in configured order
    ///
    /// Candidates are the series labels followed by the synthetic shard label,
    /// the same set the downstream endpoint will receive.
    fn affinity_labels(&self, series: &Series, shard_label: &Label) -> Vec<Label> {
        let mut picked = Vec::with_capacity(self.filter_labels.len());
        for name in &self.filter_labels {
            for label in series.labels.iter().chain(std::iter::once(shard_label)) {
                if &label.name == name {
                    picked.push(label.clone());
                }
            }
        }
        picked
    }
}
