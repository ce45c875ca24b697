//! Serve command - run the relay

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use sroute_config::Config;
use sroute_metrics::{Registry, Reporter};
use sroute_pipeline::{Router, RouterMetrics};
use sroute_sinks::SinkFactory;
use sroute_sinks::queue::{QueueMetrics, serializer_from_config};
use sroute_sinks::remote_write::RemoteWriteMetrics;

use crate::cmd::load_config;
use crate::server::{self, AppState, ReceiveMetrics};

/// Serve command arguments
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to configuration file (defaults to configs/sroute.toml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Listen address, overrides `[server] listen`
    #[arg(long)]
    pub listen: Option<String>,
}

/// Run the serve command
pub async fn run(args: ServeArgs) -> Result<()> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        platform = std::env::consts::OS,
        arch = std::env::consts::ARCH,
        config = %args.config.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "(default)".into()),
        "sroute starting"
    );

    let (mut config, config_path) = load_config(args.config.as_deref())?;
    if let Some(rejected) = config.apply_env_overrides() {
        warn!(value = %rejected, "ignoring unknown SERIALIZATION_FORMAT");
    }
    if let Some(listen) = args.listen {
        config.server.listen = listen;
    }

    if let Err(e) = run_server(config, config_path).await {
        error!(error = %e, "server error");
        return Err(e);
    }

    info!("sroute shutdown complete");
    Ok(())
}

/// Long-lived metric handles, shared across route rebuilds
struct MetricsHandles {
    receive: Arc<ReceiveMetrics>,
    router: Arc<RouterMetrics>,
    remote_write: Arc<RemoteWriteMetrics>,
    queue: Arc<QueueMetrics>,
}

impl MetricsHandles {
    fn new() -> Self {
        Self {
            receive: Arc::new(ReceiveMetrics::new()),
            router: Arc::new(RouterMetrics::new()),
            remote_write: Arc::new(RemoteWriteMetrics::new()),
            queue: Arc::new(QueueMetrics::new()),
        }
    }

    fn registry(&self, prefix: &str) -> Registry {
        Registry::new(prefix)
            .with_provider(self.receive.clone())
            .with_provider(self.router.clone())
            .with_provider(self.remote_write.clone())
            .with_provider(self.queue.clone())
    }
}

/// Main server run loop
async fn run_server(config: Config, config_path: Option<PathBuf>) -> Result<()> {
    let cancel = CancellationToken::new();
    let handles = MetricsHandles::new();

    let serializer =
        serializer_from_config(&config.serialization).context("failed to initialize serializer")?;
    info!(format = serializer.format().as_str(), "queue serializer ready");

    let factory = SinkFactory::new(
        Arc::clone(&handles.remote_write),
        Arc::clone(&handles.queue),
        serializer,
    );

    let router = Arc::new(Router::new(Arc::clone(&handles.router)));
    let report = router.rebuild(&config.routes, &factory);
    if router.route_count() == 0 {
        warn!(
            configured = config.routes.len(),
            "no active routes, writes will be rejected"
        );
    } else {
        info!(
            routes = ?router.route_names(),
            skipped = report.failed.len(),
            "routes active"
        );
    }

    let registry = handles.registry(&config.global.prefix);

    let metrics_task = {
        let reporter = Reporter::builder()
            .config(config.metrics.clone())
            .registry(registry.clone())
            .build();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            reporter.run(cancel).await;
        })
    };

    #[cfg(unix)]
    let reload_task = config_path
        .clone()
        .map(|path| spawn_reload_handler(path, Arc::clone(&router), factory.clone(), cancel.clone()));
    #[cfg(not(unix))]
    let _ = &config_path;

    let state = Arc::new(AppState {
        router: Arc::clone(&router),
        registry,
        metrics: Arc::clone(&handles.receive),
        max_body_size: config.server.max_body_size,
        shutdown: cancel.clone(),
    });
    let (addr, server_task) = server::start(&config.server.listen, state)
        .await
        .context("failed to start receiver")?;

    info!(
        listen = %addr,
        routes = router.route_count(),
        metrics_enabled = config.metrics.enabled,
        "sroute running"
    );

    wait_for_shutdown().await;

    info!("shutdown signal received, stopping receiver...");
    cancel.cancel();

    let shutdown_timeout = config.global.shutdown_timeout;
    match tokio::time::timeout(shutdown_timeout, server_task).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(error = %e, "receiver task panicked"),
        Err(_) => warn!("receiver did not stop within timeout"),
    }

    info!("waiting for in-flight deliveries to drain...");
    router.shutdown(shutdown_timeout).await;

    metrics_task.abort();
    #[cfg(unix)]
    if let Some(task) = reload_task {
        task.abort();
    }

    Ok(())
}

/// Rebuild the route table from `path` on every SIGHUP
///
/// A file that fails to load leaves the active table in place. The serializer
/// is process-wide and is not reloaded.
#[cfg(unix)]
fn spawn_reload_handler(
    path: PathBuf,
    router: Arc<Router>,
    factory: SinkFactory,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut sig = match signal::unix::signal(signal::unix::SignalKind::hangup()) {
            Ok(sig) => sig,
            Err(e) => {
                warn!(error = %e, "failed to install SIGHUP handler, reload disabled");
                return;
            }
        };
        info!(config = %path.display(), "SIGHUP handler installed for route reload");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                received = sig.recv() => {
                    if received.is_none() {
                        break;
                    }
                    reload(&path, &router, &factory);
                }
            }
        }
    })
}

#[cfg(unix)]
fn reload(path: &std::path::Path, router: &Router, factory: &SinkFactory) {
    match Config::from_file(path) {
        Ok(config) => {
            let report = router.rebuild(&config.routes, factory);
            info!(
                routes = ?router.route_names(),
                skipped = report.failed.len(),
                "SIGHUP: routes reloaded"
            );
        }
        Err(e) => {
            error!(config = %path.display(), error = %e, "SIGHUP: reload failed, keeping current routes");
        }
    }
}

/// Wait for SIGINT or SIGTERM
async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
