//! Periodic metrics reporter
//!
//! Logs a summary of every registered provider at the configured interval.
//! Runs as an async task until its cancellation token fires.

use crate::{HumanFormatter, JsonFormatter, MetricsFormatter, Registry, Snapshot};
use sroute_config::{MetricsConfig, MetricsFormat};
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Builder for constructing a Reporter
#[derive(Default)]
pub struct ReporterBuilder {
    config: Option<MetricsConfig>,
    registry: Option<Registry>,
}

impl ReporterBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the metrics configuration
    #[must_use]
    pub fn config(mut self, config: MetricsConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the registry to report from
    #[must_use]
    pub fn registry(mut self, registry: Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Build the Reporter
    pub fn build(self) -> Reporter {
        let config = self.config.unwrap_or_default();
        let formatter: Box<dyn MetricsFormatter> = match config.format {
            MetricsFormat::Human => Box::new(HumanFormatter::new()),
            MetricsFormat::Json => Box::new(JsonFormatter::new()),
        };

        Reporter {
            config,
            formatter,
            registry: self.registry.unwrap_or_default(),
            previous: None,
        }
    }
}

/// Periodic log reporter
pub struct Reporter {
    config: MetricsConfig,
    formatter: Box<dyn MetricsFormatter>,
    registry: Registry,
    previous: Option<Snapshot>,
}

impl Reporter {
    /// Create a new builder
    pub fn builder() -> ReporterBuilder {
        ReporterBuilder::new()
    }

    /// Run the reporter until cancellation
    ///
    /// Spawn this as a tokio task.
    pub async fn run(mut self, cancel: CancellationToken) {
        if !self.config.enabled {
            info!("metrics reporting disabled");
            return;
        }

        let mut ticker = interval(self.config.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // First tick completes immediately; skip it so the first report has data
        ticker.tick().await;

        info!(
            interval_secs = self.config.interval.as_secs(),
            format = ?self.config.format,
            "metrics reporter started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("metrics reporter shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    for line in self.report() {
                        info!("{}", line);
                    }
                }
            }
        }
    }

    /// Collect once and format one line per component
    pub fn report(&mut self) -> Vec<String> {
        let snapshot = Snapshot::collect(self.registry.providers());

        let lines = snapshot
            .components
            .iter()
            .map(|current| {
                let previous = self
                    .previous
                    .as_ref()
                    .and_then(|p| p.component(current.component));
                self.formatter.format_component(current, previous)
            })
            .collect();

        self.previous = Some(snapshot);
        lines
    }
}
