//! Pod Restarter
//!
//! Periodically scans a namespace for pods matching a label selector and
//! deletes the ones whose `Ready` condition is `False`, so the owning
//! controller (ReplicaSet, Deployment) recreates them. Self-healing for
//! workloads that wedge without crashing.

mod cli;
mod config;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::Cli;
use config::Config;
use restarter_core::{MetricsRegistry, ScanOutcome, Scanner};
use restarter_k8s::K8sClient;

/// Initialize the tracing/logging subsystem
fn init_logging(log_level: &str, json_format: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }
}

/// Run the scanner, periodic or one-shot
async fn run(config: Config, once: bool, shutdown_rx: watch::Receiver<bool>) -> Result<()> {
    let metrics = Arc::new(MetricsRegistry::new());

    if config.metrics.enabled {
        let port = config.metrics.port;
        tokio::spawn(async move {
            if let Err(e) = start_metrics_server(port).await {
                error!(error = %e, "Metrics server failed");
            }
        });
    }

    let scanner = Scanner::new(
        Arc::new(K8sClient::new()),
        config.namespace,
        config.label_selector,
        metrics,
    );

    if once {
        info!("Running single scan cycle (--once mode)");
        let outcome: ScanOutcome = scanner.scan_once().await?;
        info!(
            candidates = outcome.candidates.len(),
            deleted = outcome.deleted,
            failed = outcome.failed,
            "Scan complete"
        );
        return Ok(());
    }

    scanner.run(config.interval, shutdown_rx).await?;

    info!("Pod restarter shutdown complete");
    Ok(())
}

/// Start the Prometheus metrics HTTP server
async fn start_metrics_server(port: u16) -> Result<()> {
    use std::net::SocketAddr;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!(port = port, "Metrics server listening");

    loop {
        let (mut socket, _) = listener.accept().await?;

        tokio::spawn(async move {
            let mut buf = [0; 1024];
            let _ = socket.read(&mut buf).await;

            let metrics_output = prometheus::TextEncoder::new()
                .encode_to_string(&prometheus::gather())
                .unwrap_or_default();

            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\n\r\n{}",
                metrics_output.len(),
                metrics_output
            );

            let _ = socket.write_all(response.as_bytes()).await;
        });
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Initialize logging
    init_logging(&cli.log_level, cli.log_json);

    info!(version = env!("CARGO_PKG_VERSION"), "Pod restarter starting");

    // Load configuration
    let mut config = if cli.config.exists() {
        Config::from_file(&cli.config)
            .with_context(|| format!("Failed to load config from {:?}", cli.config))?
    } else {
        warn!(path = ?cli.config, "Config file not found, using defaults");
        Config::default()
    };

    // Apply CLI overrides
    if let Some(namespace) = cli.namespace {
        config.namespace = namespace;
    }
    if let Some(selector) = cli.selector {
        config.label_selector = selector;
    }
    if let Some(interval) = cli.interval {
        config.interval = interval;
    }

    // Validate configuration
    config.validate().context("Invalid configuration")?;

    info!(
        namespace = %config.namespace,
        selector = %config.label_selector,
        interval = ?config.interval,
        "Configuration loaded"
    );

    // Setup shutdown signal handler
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        let ctrl_c = async {
            signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("Failed to install SIGTERM handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received Ctrl+C, initiating shutdown");
            }
            _ = terminate => {
                info!("Received SIGTERM, initiating shutdown");
            }
        }

        let _ = shutdown_tx.send(true);
    });

    run(config, cli.once, shutdown_rx).await
}
