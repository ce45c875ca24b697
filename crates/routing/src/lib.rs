//! sroute - Routing
//!
//! Deterministic shard placement for cluster sinks.
//!
//! # Design
//!
//! Placement is a pure function of a series' label *set*:
//!
//! 1. `label_hash` flattens labels into `[name, value, ...]`, sorts the strings
//!    and feeds them through FNV-1a (32 bit). Label order never matters.
//! 2. `hash_mod(dimension, h)` picks a virtual shard, exposed downstream as the
//!    `stream_task_id` label.
//! 3. The node hash is `h`, or the hash of a configured label subset for
//!    affinity (e.g. `instance`), and `hash_mod(endpoints, node_hash)` picks
//!    the endpoint.
//!
//! A single-endpoint table skips hashing entirely and places every series on
//! node 0 without a shard label.
//!
//! # Example
//!
//! ```
//! use sroute_protocol::Series;
//! use sroute_routing::{ShardTable, hash_mod, label_hash};
//!
//! let table = ShardTable::new(2, 4, Vec::new()).unwrap();
//! let series = Series::from_pairs([("job", "a"), ("instance", "x")]);
//!
//! let placement = table.assign(&series).unwrap();
//! let h = label_hash(&series.labels);
//! assert_eq!(placement.shard, Some(hash_mod(4, h)));
//! assert!(placement.node < 2);
//! ```

mod error;
mod hash;
mod shard;

#[cfg(test)]
mod hash_test;

pub use error::{Result, RoutingError};
pub use hash::{Fnv1a32, hash_mod, label_hash};
pub use shard::{Partition, Placement, ShardTable};
