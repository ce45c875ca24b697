//! sroute - Transform
//!
//! Relabel chains that decide which series a route forwards.
//!
//! # Overview
//!
//! Each route owns a `RelabelChain` compiled from its `[[routes.relabel]]`
//! rules. The chain follows the Prometheus relabeling model (`replace`,
//! `keep`, `drop`, `keepequal`, `dropequal`, `hashmod`, `labelmap`,
//! `labeldrop`, `labelkeep`, `lowercase`, `uppercase`) but acts as a filter:
//!
//! ```text
//! [Series] -> [rule 1] -> [rule 2] -> ... -> keep? -> original Series
//! ```
//!
//! Rules run on a private copy of the labels. A series is kept when no rule
//! drops it and the final label set is non-empty.
//!
//! # Example
//!
//! ```
//! use sroute_config::{RelabelAction, RelabelRuleConfig};
//! use sroute_protocol::Series;
//! use sroute_transform::RelabelChain;
//!
//! let keep_up = RelabelRuleConfig {
//!     source_labels: vec!["__name__".into()],
//!     regex: "up".into(),
//!     action: RelabelAction::Keep,
//!     ..RelabelRuleConfig::default()
//! };
//! let chain = RelabelChain::compile(&[keep_up]).unwrap();
//!
//! assert!(chain.keep(&Series::from_pairs([("__name__", "up")])));
//! assert!(!chain.keep(&Series::from_pairs([("__name__", "down")])));
//! ```

mod chain;
mod error;
mod rule;

pub use chain::{FilterOutcome, RelabelChain};
pub use error::{TransformError, TransformResult};
pub use rule::{LabelSet, RelabelRule, is_valid_label_name};
