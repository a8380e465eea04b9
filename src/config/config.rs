use crate::config::logging_config::LoggingConfig;
use crate::config::pipeline_config::PipelineConfig;
use crate::error::PipelineError;
use crate::middleware::MiddlewareInstance;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid log level '{level}': {reason}")]
    InvalidLogLevel { level: String, reason: String },

    #[error("log_file_path is required when log_to_file is enabled")]
    MissingLogFilePath,

    #[error("Invalid middleware '{name}': {reason}")]
    InvalidMiddleware { name: String, reason: String },

    #[error("Invalid pipeline '{name}': {source}")]
    InvalidPipeline {
        name: String,
        #[source]
        source: PipelineError,
    },

    #[error("Failed to initialise logging: {0}")]
    Logging(String),
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub pipelines: HashMap<String, PipelineConfig>,
    pub middleware: HashMap<String, MiddlewareInstance>,
}

impl Config {
    /// Parse and validate a TOML document
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded configuration file");
        Self::from_toml_str(&contents)
    }

    /// Validates logging settings, middleware instances and pipeline shapes
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.logging.validate()?;

        for (name, instance) in &self.middleware {
            if instance.middleware_type.trim().is_empty() {
                return Err(ConfigError::InvalidMiddleware {
                    name: name.clone(),
                    reason: "type must not be empty".to_string(),
                });
            }
        }

        for (name, pipeline) in &self.pipelines {
            let invalid = |source| ConfigError::InvalidPipeline {
                name: name.clone(),
                source,
            };

            for entry in pipeline.entries().map_err(invalid)? {
                if let Some(target) = entry.pipeline_reference() {
                    if !self.pipelines.contains_key(target) {
                        return Err(invalid(PipelineError::UnknownPipeline(target.to_string())));
                    }
                }
            }
        }

        Ok(())
    }

    /// Pipeline names, sorted
    pub fn pipeline_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.pipelines.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
