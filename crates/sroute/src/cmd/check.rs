//! Check command - validate a config and build every route

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use sroute_config::{Config, UpstreamConfig};
use sroute_pipeline::build_routes;
use sroute_sinks::SinkFactory;
use sroute_sinks::queue::{QueueMetrics, serializer_from_config};
use sroute_sinks::remote_write::RemoteWriteMetrics;

use crate::cmd::load_config;

/// Check command arguments
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Run the check command
///
/// Prints one line per route and fails if any route does not build.
pub async fn run(args: CheckArgs) -> Result<()> {
    let (mut config, path) = load_config(args.config.as_deref())?;
    if let Some(rejected) = config.apply_env_overrides() {
        println!("warning: ignoring unknown SERIALIZATION_FORMAT '{}'", rejected);
    }

    let source = path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(defaults)".into());
    println!("config: {}", source);

    let failed = check(&config)?;
    if failed > 0 {
        anyhow::bail!("{} of {} routes failed to build", failed, config.routes.len());
    }
    println!("ok");
    Ok(())
}

/// Build every route and print a summary; returns the number of failures
fn check(config: &Config) -> Result<usize> {
    let serializer =
        serializer_from_config(&config.serialization).context("failed to initialize serializer")?;
    println!("serializer: {}", serializer.format().as_str());

    let factory = SinkFactory::new(
        Arc::new(RemoteWriteMetrics::new()),
        Arc::new(QueueMetrics::new()),
        serializer,
    );
    let report = build_routes(&config.routes, &factory);

    for route in &config.routes {
        let target = describe(&route.upstream);
        match report.failed.iter().find(|(name, _)| *name == route.name) {
            Some((_, err)) => println!("  FAIL {:<24} {}  {}", route.name, target, err),
            None => println!("  ok   {:<24} {}", route.name, target),
        }
    }

    Ok(report.failed.len())
}

fn describe(upstream: &UpstreamConfig) -> String {
    match upstream {
        UpstreamConfig::RemoteWrite(cluster) => format!(
            "remote_write x{} (dimension {})",
            cluster.urls.len(),
            cluster.dimension
        ),
        UpstreamConfig::Kafka(kafka) => format!("kafka {} -> {}", kafka.brokers, kafka.topic),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_check_counts_failed_routes() {
        let config: Config = r#"
            [[routes]]
            name = "good"
            [routes.upstream]
            type = "remote_write"
            urls = ["http://127.0.0.1:9090/api/v1/write"]

            [[routes]]
            name = "bad"
            [routes.upstream]
            type = "remote_write"
            urls = ["http://127.0.0.1:9090/api/v1/write"]
            [[routes.relabel]]
            source_labels = ["job"]
            regex = "(unclosed"
            action = "keep"
        "#
        .parse()
        .unwrap();

        assert_eq!(check(&config).unwrap(), 1);
    }

    #[test]
    fn test_describe() {
        let config: Config = r#"
            [[routes]]
            name = "k"
            [routes.upstream]
            type = "kafka"
            brokers = "k1:9092"
            topic = "metrics"
        "#
        .parse()
        .unwrap();

        assert_eq!(describe(&config.routes[0].upstream), "kafka k1:9092 -> metrics");
    }
}
