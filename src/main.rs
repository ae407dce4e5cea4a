// src/main.rs
use anyhow::{Context, Result};
use scrutzone::{
    config,
    metrics::{start_metrics_server, MetricsRegistry},
    notification::NotificationGateway,
    probe::builtin_registry,
    version, Monitor,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

const DEFAULT_CONFIG_FILE: &str = "config/scrutzone.yml";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("scrutzone=info".parse()?),
        )
        .init();

    info!("{}", version::banner());

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("SCRUTZONE_CONFIG_FILE").ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

    info!("Loading configuration from: {}", config_path);
    let config = config::load_config(&config_path)
        .await
        .context("Failed to load configuration")?;

    let registry = builtin_registry();
    info!("Registered check types: {:?}", registry.types());

    let gateway = Arc::new(
        NotificationGateway::new(config.notification.clone())
            .context("Failed to set up notification gateway")?,
    );

    let mut monitor = Monitor::new(
        registry,
        config.checks,
        &config.check_defaults,
        gateway,
    )
    .context("Invalid check configuration")?;

    // Start metrics server if enabled
    if config.metrics.enabled {
        let metrics_registry = Arc::new(MetricsRegistry::new()?);
        monitor = monitor.with_metrics(metrics_registry.collector());

        let metrics_addr: SocketAddr = ([0, 0, 0, 0], config.metrics.port).into();
        start_metrics_server(metrics_addr, metrics_registry, config.metrics.path.clone()).await?;
    }

    let running = monitor.start();

    if let Some(startup) = &config.startup_notification {
        running.announce_startup(&startup.targets).await;
    }

    shutdown_signal().await;
    running.shutdown().await;

    Ok(())
}

// Graceful shutdown handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    info!("Shutdown signal received");
}
