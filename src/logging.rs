use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

/// Console level unless `RUST_LOG` or `--log-level` says otherwise
pub const DEFAULT_CONSOLE_LEVEL: &str = "warn";

/// Install the global subscriber.
///
/// The console layer writes to stderr, filtered by `RUST_LOG` or
/// `console_level`. With `log_dir`, a daily-rotated `companion.log` receives
/// everything at `file_level`. Keep the returned guard alive until exit so
/// buffered file lines get flushed.
pub fn init_logging(
    console_level: &str,
    file_level: &str,
    log_dir: Option<&Path>,
) -> Result<Option<WorkerGuard>> {
    let console_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(console_level))
        .map_err(|e| anyhow::anyhow!("Failed to create log filter: {}", e))?;

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_filter(console_filter);

    let Some(dir) = log_dir else {
        Registry::default()
            .with(console_layer)
            .try_init()
            .context("Logging already initialized")?;
        return Ok(None);
    };

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let file_filter = EnvFilter::try_new(file_level)
        .map_err(|e| anyhow::anyhow!("Failed to create log filter: {}", e))?;
    let (file_writer, guard) = non_blocking(rolling::daily(dir, "companion.log"));
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_filter(file_filter);

    Registry::default()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Logging already initialized")?;

    debug!(dir = %dir.display(), "logging initialized");
    Ok(Some(guard))
}
