//! Structured logging with tracing
//!
//! Provides centralized logging configuration and the log helpers used by the
//! configuration store, so that every accepted, changed or rejected key
//! produces one consistently shaped record.

use rasp_domain::ConfigSource;
use rasp_domain::error::{Error, Result};

pub use crate::settings::LoggingConfig;
use crate::constants::{DEFAULT_LOG_FILE_STEM, LOG_FILTER_ENV};
use tracing::{Level, debug, info, warn};
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging with the provided configuration
///
/// `RASP_LOG` overrides the configured level with a full filter directive.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let level = parse_log_level(&config.level)?;
    let filter =
        EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(&config.level));

    let file_appender = config.file_output.as_ref().map(|path| {
        tracing_appender::rolling::daily(
            path.parent().unwrap_or_else(|| std::path::Path::new(".")),
            path.file_stem()
                .unwrap_or_else(|| std::ffi::OsStr::new(DEFAULT_LOG_FILE_STEM)),
        )
    });

    // Layer types differ between JSON and text output, hence two branches
    let result = if config.json_format {
        let stdout = fmt::layer()
            .json()
            .with_target(true)
            .with_thread_names(true);
        let registry = Registry::default().with(filter);
        if let Some(appender) = file_appender {
            let file = fmt::layer()
                .json()
                .with_writer(appender)
                .with_ansi(false)
                .with_target(true);
            registry.with(stdout).with(file).try_init()
        } else {
            registry.with(stdout).try_init()
        }
    } else {
        let stdout = fmt::layer().with_target(true).with_thread_names(true);
        let registry = Registry::default().with(filter);
        if let Some(appender) = file_appender {
            let file = fmt::layer()
                .with_writer(appender)
                .with_ansi(false)
                .with_target(true);
            registry.with(stdout).with(file).try_init()
        } else {
            registry.with(stdout).try_init()
        }
    };
    result.map_err(|e| Error::configuration(format!("Failed to install log subscriber: {}", e)))?;

    info!("Logging initialized with level: {}", level);
    Ok(())
}

/// Parse log level string to tracing Level
pub fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(Error::configuration(format!(
            "Invalid log level: {}. Use trace, debug, info, warn, or error",
            level
        ))),
    }
}

/// Log configuration loading status
pub fn log_config_loaded(config_path: &std::path::Path, success: bool) {
    if success {
        info!("Configuration loaded from {}", config_path.display());
    } else {
        warn!("Configuration file not found: {}", config_path.display());
    }
}

/// Log an accepted key
///
/// Initial values are logged as `key: value`; later writes as a change record.
pub fn log_key_applied(key: &str, value: &str, source: ConfigSource, is_init: bool) {
    if is_init {
        info!(source = %source, "{}: {}", key, value);
    } else {
        info!(
            source = %source,
            "configuration item \"{}\" changed to \"{}\"", key, value
        );
    }
}

/// Log a key whose accepted value matches the current one
pub fn log_key_unchanged(key: &str, source: ConfigSource) {
    debug!(source = %source, "configuration item \"{}\" unchanged", key);
}

/// Log a rejected key and what the store did about it
pub fn log_key_rejected(key: &str, value: &str, source: ConfigSource, reason: &str, fallback: &str) {
    warn!(
        source = %source,
        "configuration item \"{}\" failed to change to \"{}\" because: {}; {}",
        key, value, reason, fallback
    );
}
