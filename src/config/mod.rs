pub mod config;
mod logging_config;
mod pipeline_config;


pub use config::{Config, ConfigError};
pub use logging_config::LoggingConfig;
pub use pipeline_config::{parse_sequence, HandlerEntry, PipelineConfig};
