//! sroute - Prometheus remote-write relay
//!
//! # Usage
//!
//! ```bash
//! # Run the relay (default)
//! sroute
//! sroute --config configs/sroute.toml --listen 0.0.0.0:9201
//!
//! # Validate a config and compile every route without serving
//! sroute check --config configs/sroute.toml
//! ```

mod cmd;
mod server;

use std::path::Path;

use anyhow::Result;
use clap::{Parser, Subcommand};
use sroute_config::{Config, LogConfig, LogFormat, LogOutput};
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

/// sroute - Prometheus remote-write relay
#[derive(Parser, Debug)]
#[command(name = "sroute")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (error if specified but not found)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides config file.
    #[arg(short, long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the relay
    Serve(cmd::serve::ServeArgs),

    /// Validate configuration and build every route
    Check(cmd::check::CheckArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Serve(mut args)) => {
            if args.config.is_none() && cli.config.is_some() {
                args.config = cli.config;
            }
            init_logging(cli.log_level.as_deref(), args.config.as_deref())?;
            cmd::serve::run(args).await
        }
        Some(Command::Check(mut args)) => {
            if args.config.is_none() && cli.config.is_some() {
                args.config = cli.config;
            }
            // Route builders log at warn; keep the report readable
            init_logging(Some(cli.log_level.as_deref().unwrap_or("warn")), None)?;
            cmd::check::run(args).await
        }
        // No subcommand = run the relay
        None => {
            init_logging(cli.log_level.as_deref(), cli.config.as_deref())?;
            let args = cmd::serve::ServeArgs {
                config: cli.config,
                listen: None,
            };
            cmd::serve::run(args).await
        }
    }
}

/// Resolve log level: CLI flag > config file > default "info"
fn resolve_log_level(cli_level: Option<&str>, config: Option<&Config>) -> String {
    if let Some(level) = cli_level {
        return level.to_string();
    }
    if let Some(config) = config {
        return config.log.level.as_str().to_string();
    }
    "info".to_string()
}

/// Read the `[log]` section without failing startup on a broken file
///
/// The serve command reports load errors itself once logging is up.
fn peek_config(config_path: Option<&Path>) -> Option<Config> {
    let path = config_path?;
    if !path.exists() {
        return None;
    }
    Config::from_file(path).ok()
}

/// Initialize the tracing subscriber
fn init_logging(cli_level: Option<&str>, config_path: Option<&Path>) -> Result<()> {
    let config = peek_config(config_path);
    let level = resolve_log_level(cli_level, config.as_ref());
    let log = config.map(|c| c.log).unwrap_or_default();

    let filter = EnvFilter::try_new(&level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    tracing_subscriber::registry()
        .with(fmt_layer(&log))
        .with(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {}", e))?;

    Ok(())
}

/// Console or JSON lines, to stdout or stderr
fn fmt_layer<S>(log: &LogConfig) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    let layer = fmt::layer().with_target(true).with_thread_ids(false);
    match (log.format, log.output) {
        (LogFormat::Console, LogOutput::Stdout) => layer.boxed(),
        (LogFormat::Console, LogOutput::Stderr) => layer.with_writer(std::io::stderr).boxed(),
        (LogFormat::Json, LogOutput::Stdout) => layer.json().boxed(),
        (LogFormat::Json, LogOutput::Stderr) => layer.json().with_writer(std::io::stderr).boxed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_precedence() {
        let config: Config = "[log]\nlevel = \"debug\"".parse().unwrap();

        assert_eq!(resolve_log_level(Some("trace"), Some(&config)), "trace");
        assert_eq!(resolve_log_level(None, Some(&config)), "debug");
        assert_eq!(resolve_log_level(None, None), "info");
    }

    #[test]
    fn test_cli_parses_serve_flags() {
        let cli = Cli::parse_from(["sroute", "serve", "--listen", "127.0.0.1:9201", "-c", "relay.toml"]);
        match cli.command {
            Some(Command::Serve(args)) => {
                assert_eq!(args.listen.as_deref(), Some("127.0.0.1:9201"));
                assert_eq!(args.config.unwrap().to_str(), Some("relay.toml"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_defaults_to_serve() {
        let cli = Cli::parse_from(["sroute", "--config", "relay.toml"]);
        assert!(cli.command.is_none());
        assert!(cli.config.is_some());
    }
}
