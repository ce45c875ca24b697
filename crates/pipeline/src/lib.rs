//! sroute - Pipeline
//!
//! The route registry and the dispatch loop that fans each inbound batch out
//! to every configured route.
//!
//! # Architecture
//!
//! ```text
//!                          ┌──► [Relabel] ──► Route "cluster-a" ──► ClusterSink ──► endpoints
//! Batch ──► Router.dispatch ┼──► [Relabel] ──► Route "to-kafka"  ──► QueueSink   ──► topics
//!           (snapshot)      └──► ...
//! ```
//!
//! # Key Design
//!
//! - **Snapshot swap**: the active route table sits behind a `RwLock<Arc<..>>`;
//!   `dispatch` clones the `Arc` once and never sees a half-applied reload
//! - **Detached fan-out**: each route runs in its own task tracked by a
//!   `TaskTracker`; `dispatch` returns before delivery finishes
//! - **Isolation**: a failing route is logged and counted, siblings carry on
//! - **Partial builds**: a route whose filter or sink fails to build is
//!   skipped, the rest of the table still loads
//!
//! # Example
//!
//! ```ignore
//! let router = Router::new(Arc::new(RouterMetrics::new()));
//! let report = router.rebuild(&config.routes, &factory);
//! for (name, err) in &report.failed {
//!     tracing::warn!(route = %name, error = %err, "route skipped");
//! }
//!
//! router.dispatch(batch)?;
//! router.shutdown(Duration::from_secs(5)).await;
//! ```

mod error;
mod metrics;
mod route;
mod router;

pub use error::{PipelineError, Result};
pub use metrics::RouterMetrics;
pub use route::{BuildReport, Route, build_routes};
pub use router::{DispatchStatus, Router};
