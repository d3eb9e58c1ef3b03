//! Tracing subscriber setup for function runs.
//!
//! Handlers report finer-grained outcomes (skipped users, pruned tokens,
//! failed write-backs) only through logs. Those always reach stderr, so
//! stdout stays free for command output. Setting `logging.directory` adds a
//! daily-rotated file, written as JSON when `logging.json_output` is on.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

use crate::config::LoggingConfig;
use crate::error::GbResult;

/// File name prefix of the rotated log files.
pub const LOG_FILE_NAME: &str = "gatrabali.log";

/// Keeps the background file writer alive. Dropping it flushes the file.
pub struct LogGuard {
    _guard: WorkerGuard,
}

/// The filter directive for this run. `verbose` forces debug.
pub fn filter_directive(config: &LoggingConfig, verbose: bool) -> &str {
    if verbose {
        "debug"
    } else if config.level.trim().is_empty() {
        "info"
    } else {
        config.level.trim()
    }
}

/// Install the global subscriber.
///
/// Returns a guard only when file logging is enabled; hold it until exit.
/// A subscriber installed earlier in the process is left in place.
pub fn init_logging(config: &LoggingConfig, verbose: bool) -> GbResult<Option<LogGuard>> {
    let directive = filter_directive(config, verbose);
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match config.log_dir() {
        Some(dir) => {
            std::fs::create_dir_all(&dir)?;
            let (writer, guard) = tracing_appender::non_blocking(rolling::daily(&dir, LOG_FILE_NAME));
            let layer = if config.json_output {
                fmt::layer().json().with_writer(writer).boxed()
            } else {
                fmt::layer().with_ansi(false).with_writer(writer).boxed()
            };
            (Some(layer), Some(LogGuard { _guard: guard }))
        }
        None => (None, None),
    };

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact();

    let installed = Registry::default()
        .with(file_layer)
        .with(console_layer)
        .with(filter)
        .try_init()
        .is_ok();

    if installed {
        match config.log_dir() {
            Some(dir) => tracing::debug!("logging at {directive} to {}", dir.display()),
            None => tracing::debug!("logging at {directive} to stderr"),
        }
    }

    Ok(guard)
}
