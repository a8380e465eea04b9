use crate::middleware::types::{delay, halt::HaltMiddleware, passthru::PassthruMiddleware, trace};
use crate::pipeline::Handler;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Builds a handler from its configured options
pub type HandlerFactory<C, R> =
    Arc<dyn Fn(&HashMap<String, Value>) -> Result<Arc<dyn Handler<C, R>>, String> + Send + Sync>;

/// Named handler types available to config-driven pipelines.
///
/// Type names are matched case-insensitively. The registry only builds
/// handlers; it never runs them.
pub struct HandlerRegistry<C, R> {
    factories: HashMap<String, HandlerFactory<C, R>>,
}

impl<C, R> Clone for HandlerRegistry<C, R> {
    fn clone(&self) -> Self {
        Self {
            factories: self.factories.clone(),
        }
    }
}

impl<C, R> Default for HandlerRegistry<C, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, R> HandlerRegistry<C, R> {
    /// An empty registry
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a factory under `middleware_type`, replacing any previous one
    pub fn register<F>(&mut self, middleware_type: &str, factory: F) -> &mut Self
    where
        F: Fn(&HashMap<String, Value>) -> Result<Arc<dyn Handler<C, R>>, String>
            + Send
            + Sync
            + 'static,
    {
        let key = middleware_type.to_lowercase();
        tracing::trace!(middleware_type = %key, "registering middleware type");
        self.factories.insert(key, Arc::new(factory));
        self
    }

    /// Register one shared handler instance; options are ignored
    pub fn register_handler(
        &mut self,
        middleware_type: &str,
        handler: Arc<dyn Handler<C, R>>,
    ) -> &mut Self
    where
        C: 'static,
        R: 'static,
    {
        self.register(middleware_type, move |_| Ok(Arc::clone(&handler)))
    }

    pub fn contains(&self, middleware_type: &str) -> bool {
        self.factories
            .contains_key(&middleware_type.to_lowercase())
    }

    /// Registered type names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    /// Resolves a middleware type and builds a handler from `options`
    pub fn resolve(
        &self,
        middleware_type: &str,
        options: &HashMap<String, Value>,
    ) -> Result<Arc<dyn Handler<C, R>>, String> {
        let factory = self
            .factories
            .get(&middleware_type.to_lowercase())
            .ok_or_else(|| format!("Unknown middleware type: {}", middleware_type))?;

        factory(options)
            .map_err(|err| format!("Failed to build '{}' middleware: {}", middleware_type, err))
    }
}

impl<C, R> HandlerRegistry<C, R>
where
    C: Send + 'static,
    R: Send + 'static,
{
    /// A registry holding the built-in middleware types
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry
            .register("passthru", |_| Ok(Arc::new(PassthruMiddleware::new())))
            .register("halt", |_| Ok(Arc::new(HaltMiddleware::new())))
            .register("trace", |options| {
                let config = trace::parse_config(options)?;
                Ok(Arc::new(trace::TraceMiddleware::new(config)))
            })
            .register("delay", |options| {
                let config = delay::parse_config(options)?;
                Ok(Arc::new(delay::DelayMiddleware::new(config)))
            });
        registry
    }
}

impl<C, R> fmt::Debug for HandlerRegistry<C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("types", &self.names())
            .finish()
    }
}
