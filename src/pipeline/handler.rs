use crate::error::PipelineError;
use crate::pipeline::next::Next;
use async_trait::async_trait;
use futures_util::future::BoxFuture;
use std::fmt;

/// What a handler completes with: an optional value, or the failure that stops the chain
pub type HandlerResult<R> = Result<Option<R>, PipelineError>;

/// Boxed future produced by the closures behind [`handler_fn`] and [`terminal_fn`]
pub type HandlerFuture<'a, R> = BoxFuture<'a, HandlerResult<R>>;

/// A unit of work in a pipeline.
///
/// Every handler has the same shape: it receives the shared context and the
/// continuation for the rest of the sequence. A handler that has no interest
/// in what follows simply never calls `next`.
#[async_trait]
pub trait Handler<C, R>: Send + Sync {
    async fn handle<'a>(&'a self, ctx: &'a mut C, next: Next<'a, C, R>) -> HandlerResult<R>;

    /// Label used in log output
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Handler built from an async closure that may call its continuation
pub struct HandlerFn<F> {
    f: F,
}

/// Handler built from an async closure that never sees a continuation
pub struct TerminalFn<F> {
    f: F,
}

/// Handler built from a synchronous closure; always terminal
pub struct SyncFn<F> {
    f: F,
}

/// Wrap an async closure `|ctx, next| Box::pin(async move { .. })` as a handler
pub fn handler_fn<C, R, F>(f: F) -> HandlerFn<F>
where
    F: for<'a> Fn(&'a mut C, Next<'a, C, R>) -> HandlerFuture<'a, R> + Send + Sync,
{
    HandlerFn { f }
}

/// Wrap an async closure `|ctx| Box::pin(async move { .. })` as a terminal handler
pub fn terminal_fn<C, R, F>(f: F) -> TerminalFn<F>
where
    F: for<'a> Fn(&'a mut C) -> HandlerFuture<'a, R> + Send + Sync,
{
    TerminalFn { f }
}

/// Wrap a plain closure `|ctx| Ok(..)` as a terminal handler
pub fn sync_fn<C, R, F>(f: F) -> SyncFn<F>
where
    F: Fn(&mut C) -> HandlerResult<R> + Send + Sync,
{
    SyncFn { f }
}

#[async_trait]
impl<C, R, F> Handler<C, R> for HandlerFn<F>
where
    C: Send,
    R: Send,
    F: for<'a> Fn(&'a mut C, Next<'a, C, R>) -> HandlerFuture<'a, R> + Send + Sync,
{
    async fn handle<'a>(&'a self, ctx: &'a mut C, next: Next<'a, C, R>) -> HandlerResult<R> {
        (self.f)(ctx, next).await
    }

    fn name(&self) -> &str {
        "handler_fn"
    }
}

#[async_trait]
impl<C, R, F> Handler<C, R> for TerminalFn<F>
where
    C: Send,
    R: Send,
    F: for<'a> Fn(&'a mut C) -> HandlerFuture<'a, R> + Send + Sync,
{
    async fn handle<'a>(&'a self, ctx: &'a mut C, _next: Next<'a, C, R>) -> HandlerResult<R> {
        (self.f)(ctx).await
    }

    fn name(&self) -> &str {
        "terminal_fn"
    }
}

#[async_trait]
impl<C, R, F> Handler<C, R> for SyncFn<F>
where
    C: Send,
    R: Send,
    F: Fn(&mut C) -> HandlerResult<R> + Send + Sync,
{
    async fn handle<'a>(&'a self, ctx: &'a mut C, _next: Next<'a, C, R>) -> HandlerResult<R> {
        (self.f)(ctx)
    }

    fn name(&self) -> &str {
        "sync_fn"
    }
}

impl<F> fmt::Debug for HandlerFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HandlerFn")
    }
}

impl<F> fmt::Debug for TerminalFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TerminalFn")
    }
}

impl<F> fmt::Debug for SyncFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SyncFn")
    }
}
