use crate::error::PipelineError;
use crate::middleware::MiddlewareInstance;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PipelineConfig {
    pub description: String,
    /// Ordered middleware; kept raw so a malformed sequence is reported by position
    pub middleware: toml::Value,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            description: default_description(),
            middleware: toml::Value::Array(Vec::new()),
        }
    }
}

fn default_description() -> String {
    "Unnamed pipeline".to_string()
}

impl PipelineConfig {
    pub fn entries(&self) -> Result<Vec<HandlerEntry>, PipelineError> {
        parse_sequence(&self.middleware)
    }
}

/// One position of a configured pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerEntry {
    /// `pipeline.<name>`, `middleware.<name>`, a `[middleware.<name>]` key or a registry type
    Named(String),
    /// `{ type = "...", options = { ... } }`
    Inline(MiddlewareInstance),
}

impl HandlerEntry {
    /// The referenced pipeline for `pipeline.<name>` / `pipelines.<name>` entries
    pub fn pipeline_reference(&self) -> Option<&str> {
        match self {
            HandlerEntry::Named(raw) => raw
                .strip_prefix("pipeline.")
                .or_else(|| raw.strip_prefix("pipelines.")),
            HandlerEntry::Inline(_) => None,
        }
    }
}

/// Validates a raw middleware value into handler entries.
///
/// The value must be an array; each element must be a non-empty string or a
/// table with a `type` key.
pub fn parse_sequence(value: &toml::Value) -> Result<Vec<HandlerEntry>, PipelineError> {
    let items = value.as_array().ok_or_else(|| {
        PipelineError::InvalidSequence(format!(
            "expected an array of middleware, found {}",
            value.type_str()
        ))
    })?;

    items
        .iter()
        .enumerate()
        .map(|(position, item)| match item {
            toml::Value::String(name) if name.trim().is_empty() => Err(
                PipelineError::invalid_handler(position, "middleware name is empty"),
            ),
            toml::Value::String(name) => Ok(HandlerEntry::Named(name.trim().to_string())),
            toml::Value::Table(_) => item
                .clone()
                .try_into::<MiddlewareInstance>()
                .map(HandlerEntry::Inline)
                .map_err(|err| {
                    PipelineError::invalid_handler(
                        position,
                        format!("invalid middleware table: {}", err),
                    )
                }),
            other => Err(PipelineError::invalid_handler(
                position,
                format!(
                    "expected a middleware name or table, found {}",
                    other.type_str()
                ),
            )),
        })
        .collect()
}
