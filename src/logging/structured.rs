//! Structured logging setup using tracing
//!
//! Console output is always on. When `logging.local_enabled` is set, a JSON
//! layer writes to a rolling file under `logging.local_path`.

use crate::config::LoggingConfig;
use crate::domain::{NmdoseError, Result};
use std::path::{Path, PathBuf};
use tracing::{Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// File name prefix of the rolling JSON log
const LOG_FILE_PREFIX: &str = "nmdose.log";

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

/// Keeps the file writer alive; drop it last so buffered lines are flushed
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
    log_dir: Option<PathBuf>,
}

impl LoggingGuard {
    /// Directory of the JSON log, if file logging is on
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }
}

/// Initialize the logging system based on configuration
///
/// `RUST_LOG` takes precedence over `log_level_str` when set.
///
/// # Errors
///
/// Returns an error if the level is unknown, the log directory cannot be
/// created, or a global subscriber is already installed.
///
/// # Example
///
/// ```no_run
/// use nmdose::logging::init_logging;
/// use nmdose::config::LoggingConfig;
///
/// let config = LoggingConfig::default();
/// let _guard = init_logging("info", &config).expect("Failed to initialize logging");
/// ```
pub fn init_logging(log_level_str: &str, config: &LoggingConfig) -> Result<LoggingGuard> {
    let log_level = parse_log_level(log_level_str)?;
    let filter = || {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("nmdose={log_level}")))
    };

    let mut layers = vec![console_layer(filter())];
    let mut guard = LoggingGuard {
        _file_guard: None,
        log_dir: None,
    };

    if config.local_enabled {
        let (layer, worker) = file_layer(config, filter())?;
        layers.push(layer);
        guard._file_guard = Some(worker);
        guard.log_dir = Some(PathBuf::from(&config.local_path));
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| NmdoseError::Configuration(format!("Failed to install logger: {e}")))?;

    tracing::debug!(
        level = %log_level,
        log_dir = ?guard.log_dir,
        "Logging initialized"
    );

    Ok(guard)
}

fn console_layer<S>(filter: EnvFilter) -> BoxedLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_filter(filter)
        .boxed()
}

fn file_layer<S>(config: &LoggingConfig, filter: EnvFilter) -> Result<(BoxedLayer<S>, WorkerGuard)>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    std::fs::create_dir_all(&config.local_path).map_err(|e| {
        NmdoseError::Configuration(format!(
            "Failed to create log directory {}: {e}",
            config.local_path
        ))
    })?;

    let appender = RollingFileAppender::new(
        parse_rotation(&config.local_rotation),
        &config.local_path,
        LOG_FILE_PREFIX,
    );
    let (writer, worker) = tracing_appender::non_blocking(appender);

    let layer = tracing_subscriber::fmt::layer()
        .json()
        .with_current_span(true)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(writer)
        .with_filter(filter)
        .boxed();

    Ok((layer, worker))
}

fn parse_rotation(rotation: &str) -> Rotation {
    match rotation {
        "hourly" => Rotation::HOURLY,
        "never" => Rotation::NEVER,
        _ => Rotation::DAILY,
    }
}

fn parse_log_level(level_str: &str) -> Result<Level> {
    level_str.trim().parse::<Level>().map_err(|_| {
        NmdoseError::Configuration(format!(
            "Invalid log level: {level_str}. Must be one of: trace, debug, info, warn, error"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("trace", Level::TRACE)]
    #[test_case("debug", Level::DEBUG)]
    #[test_case("Info", Level::INFO)]
    #[test_case("WARN", Level::WARN)]
    #[test_case(" error ", Level::ERROR)]
    fn test_parse_log_level(input: &str, expected: Level) {
        assert_eq!(parse_log_level(input).unwrap(), expected);
    }

    #[test]
    fn test_parse_log_level_invalid() {
        assert!(parse_log_level("verbose").is_err());
        assert!(parse_log_level("").is_err());
    }

    #[test]
    fn test_parse_rotation() {
        assert_eq!(parse_rotation("hourly"), Rotation::HOURLY);
        assert_eq!(parse_rotation("never"), Rotation::NEVER);
        assert_eq!(parse_rotation("daily"), Rotation::DAILY);
        assert_eq!(parse_rotation("weekly"), Rotation::DAILY);
    }

    #[test]
    fn test_file_layer_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            local_enabled: true,
            local_path: dir.path().join("logs").to_string_lossy().to_string(),
            local_rotation: "never".to_string(),
        };

        let (_layer, _worker) =
            file_layer::<tracing_subscriber::Registry>(&config, EnvFilter::new("info")).unwrap();
        assert!(dir.path().join("logs").is_dir());
    }
}
