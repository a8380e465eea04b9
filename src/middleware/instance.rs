use crate::middleware::registry::HandlerRegistry;
use crate::pipeline::Handler;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

/// A configured middleware: a registry type plus its options
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct MiddlewareInstance {
    #[serde(rename = "type")]
    pub middleware_type: String,
    #[serde(default)]
    pub options: HashMap<String, serde_json::Value>,
}

impl MiddlewareInstance {
    pub fn new(middleware_type: impl Into<String>) -> Self {
        Self {
            middleware_type: middleware_type.into(),
            options: HashMap::new(),
        }
    }

    pub fn with_option(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }

    /// Builds the handler through the given registry
    pub fn resolve<C, R>(
        &self,
        registry: &HandlerRegistry<C, R>,
    ) -> Result<Arc<dyn Handler<C, R>>, String> {
        registry.resolve(&self.middleware_type, &self.options)
    }
}
