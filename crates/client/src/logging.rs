//! Logging setup: warnings to stderr, everything `RUST_LOG` allows to a file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const LOG_FILE: &str = "pokechain.log";

/// Platform log directory, overridable with `POKECHAIN_LOG_DIR`.
///
/// - macOS: `~/Library/Caches/pokechain/logs`
/// - Linux: `~/.cache/pokechain/logs` (or `$XDG_CACHE_HOME/pokechain/logs`)
/// - Windows: `%LOCALAPPDATA%\pokechain\logs`
/// - Fallback: `/tmp/pokechain/logs`
pub fn log_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("POKECHAIN_LOG_DIR") {
        return PathBuf::from(dir);
    }

    directories::ProjectDirs::from("", "", "pokechain")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("/tmp/pokechain"))
        .join("logs")
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// lifetime of the process.
pub fn setup_logging() -> Result<WorkerGuard> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    // Command output owns stdout; stderr only carries warnings and errors.
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .with_filter(LevelFilter::WARN);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    tracing::info!("Logging initialized");
    tracing::info!("Log file: {}/{}", log_dir.display(), LOG_FILE);

    Ok(guard)
}
