use std::fs;

use anyhow::{Context, Result};
use etlkit_core::EtlConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Appends plain-text records to the configured log file and mirrors them to stderr as JSON.
///
/// The returned guard must be held until exit or buffered file records are lost.
pub fn init(config: &EtlConfig) -> Result<WorkerGuard> {
    fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("creating log directory {}", config.log_dir.display()))?;

    let appender = tracing_appender::rolling::never(&config.log_dir, &config.log_file);
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(false);
    let console_layer = fmt::layer().json().with_writer(std::io::stderr);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("installing tracing subscriber")?;

    Ok(guard)
}
