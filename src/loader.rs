//! Builds [`Pipeline`]s from the `[pipelines]` and `[middleware]` tables of a [`Config`]

use crate::config::{Config, HandlerEntry};
use crate::error::PipelineError;
use crate::middleware::HandlerRegistry;
use crate::pipeline::{Handler, Pipeline};
use std::collections::HashMap;
use std::sync::Arc;

/// Resolves configured pipelines into runnable ones.
///
/// A named entry is resolved in this order:
/// 1. `pipeline.<name>` / `pipelines.<name>`: another configured pipeline, nested
/// 2. `middleware.<name>` or `<name>` matching a `[middleware.<name>]` instance
/// 3. `<name>` matching a registered middleware type, built with no options
///
/// Each pipeline is built once per loader; nested references share the built copy.
pub struct PipelineLoader<'a, C, R> {
    config: &'a Config,
    registry: &'a HandlerRegistry<C, R>,
    built: HashMap<String, Pipeline<C, R>>,
}

impl<'a, C, R> PipelineLoader<'a, C, R>
where
    C: Send + 'static,
    R: Send + 'static,
{
    pub fn new(config: &'a Config, registry: &'a HandlerRegistry<C, R>) -> Self {
        Self {
            config,
            registry,
            built: HashMap::new(),
        }
    }

    /// Build the pipeline configured as `[pipelines.<name>]`
    pub fn load(&mut self, name: &str) -> Result<Pipeline<C, R>, PipelineError> {
        let mut visiting = Vec::new();
        self.load_inner(name, &mut visiting)
    }

    /// Build every configured pipeline, keyed by name
    pub fn load_all(&mut self) -> Result<HashMap<String, Pipeline<C, R>>, PipelineError> {
        let config = self.config;
        let mut pipelines = HashMap::with_capacity(config.pipelines.len());
        for name in config.pipeline_names() {
            pipelines.insert(name.to_string(), self.load(name)?);
        }
        Ok(pipelines)
    }

    fn load_inner(
        &mut self,
        name: &str,
        visiting: &mut Vec<String>,
    ) -> Result<Pipeline<C, R>, PipelineError> {
        if let Some(pipeline) = self.built.get(name) {
            return Ok(pipeline.clone());
        }

        let config = self.config;
        let pipeline_config = config
            .pipelines
            .get(name)
            .ok_or_else(|| PipelineError::UnknownPipeline(name.to_string()))?;
        let entries = pipeline_config.entries()?;

        visiting.push(name.to_string());
        let mut handlers = Vec::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            handlers.push(self.resolve_entry(position, entry, visiting)?);
        }
        visiting.pop();

        let pipeline = Pipeline::new(handlers).with_name(name);
        tracing::debug!(
            pipeline = name,
            description = %pipeline_config.description,
            handlers = pipeline.len(),
            "built pipeline"
        );
        self.built.insert(name.to_string(), pipeline.clone());
        Ok(pipeline)
    }

    fn resolve_entry(
        &mut self,
        position: usize,
        entry: &HandlerEntry,
        visiting: &mut Vec<String>,
    ) -> Result<Arc<dyn Handler<C, R>>, PipelineError> {
        let raw = match entry {
            HandlerEntry::Inline(instance) => {
                return instance
                    .resolve(self.registry)
                    .map_err(|reason| PipelineError::invalid_handler(position, reason));
            }
            HandlerEntry::Named(raw) => raw,
        };

        if let Some(target) = entry.pipeline_reference() {
            if visiting.iter().any(|name| name == target) {
                let mut cycle = visiting.clone();
                cycle.push(target.to_string());
                return Err(PipelineError::invalid_handler(
                    position,
                    format!("pipeline reference cycle: {}", cycle.join(" -> ")),
                ));
            }
            return Ok(self.load_inner(target, visiting)?.into_handler());
        }

        // Normalize name: accept forms like middleware.audit or audit
        let key = raw.strip_prefix("middleware.").unwrap_or(raw);

        if let Some(instance) = self.config.middleware.get(key) {
            return instance
                .resolve(self.registry)
                .map_err(|reason| PipelineError::invalid_handler(position, reason));
        }

        if self.registry.contains(key) {
            return self
                .registry
                .resolve(key, &HashMap::new())
                .map_err(|reason| PipelineError::invalid_handler(position, reason));
        }

        Err(PipelineError::invalid_handler(
            position,
            format!(
                "'{}' is neither a configured middleware nor a registered type",
                raw
            ),
        ))
    }
}
