use crate::config::ConfigError;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `harmonia=debug,warn`
    pub log_level: String,
    pub log_to_file: bool,
    pub log_file_path: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_to_file: false,
            log_file_path: String::new(),
        }
    }
}

impl LoggingConfig {
    pub fn env_filter(&self) -> Result<EnvFilter, ConfigError> {
        EnvFilter::try_new(&self.log_level).map_err(|err| ConfigError::InvalidLogLevel {
            level: self.log_level.clone(),
            reason: err.to_string(),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.env_filter()?;
        if self.log_to_file && self.log_file_path.trim().is_empty() {
            return Err(ConfigError::MissingLogFilePath);
        }
        Ok(())
    }
}
