//! Process-wide `tracing` setup driven by [`LoggingConfig`]

use crate::config::{ConfigError, LoggingConfig};
use std::sync::Mutex;
use tracing_subscriber::prelude::*;

/// Install the global subscriber.
///
/// Logs go to stdout, and additionally to `log_file_path` when `log_to_file`
/// is set. Fails if a global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<(), ConfigError> {
    config.validate()?;
    let filter = config.env_filter()?;

    if config.log_to_file {
        let file = std::fs::File::create(&config.log_file_path).map_err(|source| {
            ConfigError::Io {
                path: config.log_file_path.clone(),
                source,
            }
        })?;

        let file_appender = tracing_subscriber::fmt::layer()
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .with_writer(Mutex::new(file));

        let stdout_appender = tracing_subscriber::fmt::layer()
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_appender)
            .with(stdout_appender)
            .try_init()
            .map_err(|err| ConfigError::Logging(err.to_string()))?;
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_file(true)
            .with_line_number(true)
            .try_init()
            .map_err(|err| ConfigError::Logging(err.to_string()))?;
    }

    tracing::debug!(level = %config.log_level, to_file = config.log_to_file, "logging initialised");
    Ok(())
}
