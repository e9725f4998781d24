//! Logging setup
//!
//! Installs a global `tracing` subscriber filtered by `RUST_LOG` (default
//! `info`) and writing to stdout through a non-blocking writer. Keep the
//! returned guard alive for the lifetime of the process or buffered events
//! are lost on exit.

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LogFormat;

/// Initialize the global subscriber
pub fn init_logging(format: LogFormat) -> Result<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,tower_http=debug"))
        .context("Failed to build log filter")?;

    let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(writer).with_target(true))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(writer))
            .try_init(),
    }
    .context("Failed to install tracing subscriber")?;

    tracing::info!("Logging initialized ({:?})", format);
    Ok(guard)
}
