//! Logging setup
//!
//! One log file per day under `$XDG_STATE_HOME/textlens/`, pruned to the
//! configured number of files. `RUST_LOG` overrides the configured level
//! for a single run.

use crate::config::{Config, LoggingConfig};
use crate::error::{Error, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Keeps the background log writer alive.
///
/// Dropping the guard flushes pending lines, so the binary holds it for
/// the whole process lifetime.
pub struct LoggingGuard {
    _guard: WorkerGuard,
}

/// Install the global subscriber writing to the daily-rolled log file.
pub fn init(config: &LoggingConfig) -> Result<LoggingGuard> {
    let log_dir = Config::state_dir();
    std::fs::create_dir_all(&log_dir)?;

    let appender = daily_appender(&log_dir, config.max_files)?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .init();

    tracing::info!(
        log_dir = %log_dir.display(),
        level = %config.level,
        max_files = config.max_files,
        "logging initialized"
    );

    Ok(LoggingGuard { _guard: guard })
}

fn daily_appender(log_dir: &std::path::Path, max_files: usize) -> Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("textlens.log")
        .max_log_files(max_files)
        .build(log_dir)
        .map_err(|e| Error::Config(format!("failed to open log file: {}", e)))
}
