//! Logging setup
//!
//! Console output is always on (plain or JSON). File output is optional and
//! goes through a non-blocking rolling appender; keep the returned guard
//! alive until shutdown so buffered lines are flushed.

use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::{config::LoggingConfig, Error, Result};

/// Holds the file writer guard, if file logging is enabled.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Install the global subscriber. `RUST_LOG` takes precedence over
/// `logging.level`.
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| Error::Config(format!("invalid logging.level '{}': {e}", config.level)))?;

    let console = if config.json {
        fmt::layer().json().with_target(true).boxed()
    } else {
        fmt::layer().with_target(true).boxed()
    };

    let (file, file_guard) = if config.file_enabled {
        let rotation = parse_rotation(&config.file_rotation).map_err(Error::Config)?;
        std::fs::create_dir_all(&config.file_directory).map_err(|e| {
            Error::Config(format!(
                "cannot create log directory {}: {e}",
                config.file_directory
            ))
        })?;
        let appender = RollingFileAppender::new(
            rotation,
            &config.file_directory,
            &config.file_prefix,
        );
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer()
            .json()
            .with_ansi(false)
            .with_writer(writer)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| Error::Config(format!("logging already initialized: {e}")))?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

pub fn parse_rotation(value: &str) -> std::result::Result<Rotation, String> {
    match value.to_ascii_lowercase().as_str() {
        "daily" => Ok(Rotation::DAILY),
        "hourly" => Ok(Rotation::HOURLY),
        "minutely" => Ok(Rotation::MINUTELY),
        "never" => Ok(Rotation::NEVER),
        other => Err(format!(
            "logging.file_rotation must be one of daily, hourly, minutely, never (got '{other}')"
        )),
    }
}
