//! Tracing setup for teampulse
//!
//! Events go to a rolling file in `$XDG_STATE_HOME/teampulse/`, never to the
//! terminal, so reports on stdout stay machine-readable. The HTTP stack used
//! by the live tracker is held at `logging.transport_level` so that a
//! `debug` run shows provider selection and fetch counts rather than
//! connection-pool chatter. `RUST_LOG`, when set, replaces both levels.

use crate::config::{Config, LogRotation, LoggingConfig};
use crate::error::{Error, Result};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Prefix of every log file; rotated files append a date suffix.
pub const LOG_FILE_PREFIX: &str = "teampulse.log";

/// Crates beneath the HTTP task tracker.
const TRANSPORT_TARGETS: &[&str] = &["reqwest", "hyper", "hyper_util", "h2", "rustls"];

/// Install the global subscriber.
///
/// Keep the returned guard alive for the life of the process; dropping it
/// flushes buffered events. Fails with [`Error::Config`] on an unknown
/// level, or if the log file cannot be opened.
pub fn init(config: &LoggingConfig) -> Result<LoggingGuard> {
    let filter = build_filter(config)?;

    let log_dir = Config::state_dir();
    std::fs::create_dir_all(&log_dir)?;

    let appender = RollingFileAppender::builder()
        .rotation(rotation(config.rotation))
        .filename_prefix(LOG_FILE_PREFIX)
        .build(&log_dir)
        .map_err(|e| Error::Config(format!("failed to open log file in {:?}: {}", log_dir, e)))?;
    let (writer, worker) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()
        .map_err(|e| Error::Config(format!("logging already initialized: {}", e)))?;

    tracing::info!(
        log_dir = %log_dir.display(),
        level = %config.level,
        rotation = config.rotation.as_str(),
        "Logging initialized"
    );

    Ok(LoggingGuard { _worker: worker })
}

/// Route events to the test harness output, honoring `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Flushes pending log writes when dropped.
pub struct LoggingGuard {
    _worker: tracing_appender::non_blocking::WorkerGuard,
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    // Config levels are validated even when RUST_LOG is set
    let directives = filter_directives(config)?;
    match EnvFilter::try_from_default_env() {
        Ok(from_env) => Ok(from_env),
        Err(_) => EnvFilter::try_new(&directives)
            .map_err(|e| Error::Config(format!("invalid log filter '{}': {}", directives, e))),
    }
}

/// Filter directives for the configured levels.
fn filter_directives(config: &LoggingConfig) -> Result<String> {
    let level = parse_level("logging.level", &config.level)?;
    let transport = parse_level("logging.transport_level", &config.transport_level)?;

    let mut directives = vec![level];
    directives.extend(
        TRANSPORT_TARGETS
            .iter()
            .map(|target| format!("{}={}", target, transport)),
    );
    Ok(directives.join(","))
}

fn parse_level(key: &str, value: &str) -> Result<String> {
    let level: LevelFilter = value.trim().parse().map_err(|_| {
        Error::Config(format!(
            "{} must be one of off, error, warn, info, debug, trace (got '{}')",
            key, value
        ))
    })?;
    Ok(level.to_string().to_lowercase())
}

fn rotation(rotation: LogRotation) -> Rotation {
    match rotation {
        LogRotation::Hourly => Rotation::HOURLY,
        LogRotation::Daily => Rotation::DAILY,
        LogRotation::Never => Rotation::NEVER,
    }
}
