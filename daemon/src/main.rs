//! OtpCourier daemon
//!
//! Loads configuration from the environment, wires the configured backend and
//! channel providers, then runs the retry and token-refresh workers until
//! SIGINT or SIGTERM.

use anyhow::{Context, Result};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use oc_infra::ServiceContainer;
use oc_shared::config::{AppConfig, LogFormat, LoggingConfig};

/// Grace period for workers to finish their current run
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env();
    init_tracing(&config.logging)?;

    info!(
        environment = %config.environment,
        backend = ?config.cache.backend,
        tenants = ?config.channels.tenants,
        event = "daemon_starting"
    );

    let container = ServiceContainer::build(&config)
        .await
        .context("failed to build service container")?;

    let cancel = CancellationToken::new();
    let retry_handle = container
        .retry_worker
        .clone()
        .start(cancel.clone(), config.worker.retry_interval());
    let refresh_handle = container
        .token_refresh_worker
        .clone()
        .start(cancel.clone(), config.worker.token_refresh_interval());

    info!(
        retry_interval_secs = config.worker.retry_interval_seconds,
        token_refresh_interval_secs = config.worker.token_refresh_interval_seconds,
        event = "workers_started"
    );

    shutdown_signal().await;
    info!(event = "shutdown_requested");
    cancel.cancel();

    let joined = tokio::time::timeout(SHUTDOWN_TIMEOUT, async {
        let (retry, refresh) = tokio::join!(retry_handle, refresh_handle);
        if let Err(e) = retry {
            error!(error = %e, event = "retry_worker_panicked");
        }
        if let Err(e) = refresh {
            error!(error = %e, event = "token_refresh_worker_panicked");
        }
    })
    .await;

    if joined.is_err() {
        warn!(
            timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
            event = "shutdown_timed_out"
        );
    }

    info!(event = "daemon_stopped");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .context("invalid log filter")?;

    let registry = tracing_subscriber::registry().with(filter);
    let result = match logging.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_file(logging.source_location)
                    .with_line_number(logging.source_location),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_ansi(logging.colored)
                    .with_file(logging.source_location)
                    .with_line_number(logging.source_location),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_ansi(logging.colored))
            .try_init(),
    };

    result.context("failed to install tracing subscriber")
}

/// Resolves on CTRL+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, event = "signal_handler_failed");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, event = "signal_handler_failed");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!(signal = "SIGINT", event = "signal_received"),
        _ = terminate => info!(signal = "SIGTERM", event = "signal_received"),
    }
}
