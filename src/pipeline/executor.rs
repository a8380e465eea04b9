use crate::pipeline::dispatch::Dispatch;
use crate::pipeline::handler::{
    handler_fn, sync_fn, terminal_fn, Handler, HandlerFuture, HandlerResult,
};
use crate::pipeline::next::Next;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::Instrument;

const DEFAULT_NAME: &str = "pipeline";

/// Protocol-agnostic pipeline executor
///
/// Closes over an immutable, ordered sequence of handlers and runs them
/// onion-style: code before `next.run(ctx)` executes in ascending order, code
/// after it unwinds in descending order. Cloning is cheap and every clone
/// shares the same sequence.
///
/// A `Pipeline` is itself a [`Handler`], so pipelines nest. When a nested
/// pipeline runs past its own last handler, control continues with the
/// continuation of the pipeline that invoked it.
pub struct Pipeline<C, R> {
    name: Arc<str>,
    handlers: Arc<[Arc<dyn Handler<C, R>>]>,
}

impl<C, R> Clone for Pipeline<C, R> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            handlers: Arc::clone(&self.handlers),
        }
    }
}

impl<C, R> Pipeline<C, R> {
    /// Build a pipeline from an ordered sequence of handlers. An empty sequence is valid.
    pub fn new(handlers: impl IntoIterator<Item = Arc<dyn Handler<C, R>>>) -> Self {
        Self {
            name: Arc::from(DEFAULT_NAME),
            handlers: handlers.into_iter().collect(),
        }
    }

    pub fn builder() -> PipelineBuilder<C, R> {
        PipelineBuilder::new()
    }

    /// Label this pipeline in log output
    pub fn with_name(mut self, name: impl AsRef<str>) -> Self {
        self.name = Arc::from(name.as_ref());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn handlers(&self) -> &[Arc<dyn Handler<C, R>>] {
        &self.handlers
    }

    /// The flattened concatenation of `self` followed by `other`
    pub fn then(&self, other: &Pipeline<C, R>) -> Pipeline<C, R> {
        Self {
            name: Arc::clone(&self.name),
            handlers: self
                .handlers
                .iter()
                .chain(other.handlers.iter())
                .cloned()
                .collect(),
        }
    }
}

impl<C, R> Pipeline<C, R>
where
    C: Send + 'static,
    R: Send + 'static,
{
    /// Erase this pipeline into a handler for use inside another pipeline
    pub fn into_handler(self) -> Arc<dyn Handler<C, R>> {
        Arc::new(self)
    }
}

impl<C: Send, R: Send> Pipeline<C, R> {
    /// Run the pipeline against `ctx` with nothing behind it.
    ///
    /// Resolves with the value returned by the handler in the final slot. If
    /// a handler ends the chain early by not running its continuation, its
    /// return value is used instead. A handler that recovers from a
    /// downstream failure never supplies the result, so such a run resolves
    /// with `None` unless the final slot itself recovered.
    pub async fn run(&self, ctx: &mut C) -> HandlerResult<R> {
        self.run_with(ctx, None).await
    }

    /// Run the pipeline with `outer` standing in after the last handler.
    pub fn run_with<'a>(
        &'a self,
        ctx: &'a mut C,
        outer: Option<&'a Next<'a, C, R>>,
    ) -> HandlerFuture<'a, R> {
        let span = tracing::debug_span!(
            "pipeline",
            name = %self.name,
            handlers = self.handlers.len(),
            nested = outer.is_some()
        );

        Box::pin(
            async move {
                let dispatch = Dispatch::new(&self.handlers, outer);
                dispatch.dispatch(0, ctx).await?;
                let captured = dispatch.into_captured();
                tracing::trace!(captured = captured.is_some(), "pipeline completed");
                Ok(captured)
            }
            .instrument(span),
        )
    }
}

#[async_trait]
impl<C: Send, R: Send> Handler<C, R> for Pipeline<C, R> {
    async fn handle<'a>(&'a self, ctx: &'a mut C, next: Next<'a, C, R>) -> HandlerResult<R> {
        self.run_with(ctx, Some(&next)).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<C, R> fmt::Debug for Pipeline<C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field(
                "handlers",
                &self.handlers.iter().map(|h| h.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Incrementally assembles a [`Pipeline`]
pub struct PipelineBuilder<C, R> {
    name: Option<String>,
    handlers: Vec<Arc<dyn Handler<C, R>>>,
}

impl<C, R> Default for PipelineBuilder<C, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, R> PipelineBuilder<C, R> {
    pub fn new() -> Self {
        Self {
            name: None,
            handlers: Vec::new(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn handler(mut self, handler: Arc<dyn Handler<C, R>>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn build(self) -> Pipeline<C, R> {
        let pipeline = Pipeline::new(self.handlers);
        match self.name {
            Some(name) => pipeline.with_name(name),
            None => pipeline,
        }
    }
}

impl<C, R> PipelineBuilder<C, R>
where
    C: Send + 'static,
    R: Send + 'static,
{
    /// Append a handler that may call its continuation
    pub fn handler_fn<F>(self, f: F) -> Self
    where
        F: for<'a> Fn(&'a mut C, Next<'a, C, R>) -> HandlerFuture<'a, R> + Send + Sync + 'static,
    {
        self.handler(Arc::new(handler_fn(f)))
    }

    /// Append an async handler that ignores its continuation
    pub fn terminal_fn<F>(self, f: F) -> Self
    where
        F: for<'a> Fn(&'a mut C) -> HandlerFuture<'a, R> + Send + Sync + 'static,
    {
        self.handler(Arc::new(terminal_fn(f)))
    }

    /// Append a synchronous handler that ignores its continuation
    pub fn sync_fn<F>(self, f: F) -> Self
    where
        F: Fn(&mut C) -> HandlerResult<R> + Send + Sync + 'static,
    {
        self.handler(Arc::new(sync_fn(f)))
    }

    /// Append a whole pipeline as a single handler
    pub fn pipeline(self, pipeline: Pipeline<C, R>) -> Self {
        self.handler(pipeline.into_handler())
    }
}
