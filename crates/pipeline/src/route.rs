//! Route - a name, a relabel chain and the sink it feeds

use std::collections::HashSet;
use std::sync::Arc;

use sroute_config::RouteConfig;
use sroute_protocol::Batch;
use sroute_sinks::{Sink, SinkFactory};
use sroute_transform::{FilterOutcome, RelabelChain};

use crate::{PipelineError, Result};

/// One configured delivery path
///
/// Immutable once built; a reload replaces the whole route.
pub struct Route {
    name: String,
    chain: RelabelChain,
    sink: Box<dyn Sink>,
}

impl Route {
    /// Assemble a route from already-built parts
    pub fn new(name: impl Into<String>, chain: RelabelChain, sink: Box<dyn Sink>) -> Self {
        Self {
            name: name.into(),
            chain,
            sink,
        }
    }

    /// Compile the relabel chain and build the sink for `config`
    pub fn build(config: &RouteConfig, factory: &SinkFactory) -> Result<Self> {
        let chain = RelabelChain::compile(&config.relabel).map_err(|source| PipelineError::Relabel {
            route: config.name.clone(),
            source,
        })?;
        let sink = factory
            .build(&config.name, &config.upstream)
            .map_err(|source| PipelineError::Sink {
                route: config.name.clone(),
                source,
            })?;
        Ok(Self::new(config.name.clone(), chain, sink))
    }

    /// Route name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Relabel chain
    pub fn chain(&self) -> &RelabelChain {
        &self.chain
    }

    /// Sink owned by this route
    pub fn sink(&self) -> &dyn Sink {
        self.sink.as_ref()
    }

    /// Route-local copies of the series that survive the chain
    pub fn filter(&self, batch: &Batch) -> FilterOutcome {
        self.chain.filter(batch)
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.name)
            .field("rules", &self.chain.len())
            .field("sink", &self.sink.kind())
            .finish()
    }
}

/// Result of building a route table
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Routes that built, in config order
    pub routes: Vec<Arc<Route>>,
    /// Routes that were skipped and why
    pub failed: Vec<(String, PipelineError)>,
}

impl BuildReport {
    /// Whether every configured route built
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Build every route in `configs`
///
/// A route that fails to build is skipped and reported; the others still load.
pub fn build_routes(configs: &[RouteConfig], factory: &SinkFactory) -> BuildReport {
    let mut report = BuildReport::default();
    let mut seen = HashSet::new();

    for config in configs {
        if !seen.insert(config.name.as_str()) {
            let err = PipelineError::DuplicateRoute(config.name.clone());
            tracing::warn!(route = %config.name, error = %err, "route skipped");
            report.failed.push((config.name.clone(), err));
            continue;
        }

        match Route::build(config, factory) {
            Ok(route) => {
                tracing::debug!(
                    route = %route.name(),
                    rules = route.chain().len(),
                    sink = route.sink().kind(),
                    "route built"
                );
                report.routes.push(Arc::new(route));
            }
            Err(err) => {
                tracing::warn!(route = %config.name, error = %err, "route skipped");
                report.failed.push((config.name.clone(), err));
            }
        }
    }

    report
}
