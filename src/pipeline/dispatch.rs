use crate::error::PipelineError;
use crate::pipeline::handler::Handler;
use crate::pipeline::next::Next;
use futures_util::future::BoxFuture;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Bookkeeping for one invocation of a pipeline.
///
/// Lives on the stack of a single `run` call and is borrowed by every
/// continuation created during that call. Nothing here is shared between
/// invocations.
pub(crate) struct Dispatch<'a, C, R> {
    handlers: &'a [Arc<dyn Handler<C, R>>],
    /// Continuation of the enclosing pipeline, standing in at position `handlers.len()`
    outer: Option<&'a Next<'a, C, R>>,
    /// One past the highest position entered so far; 0 before the first dispatch
    entered: AtomicUsize,
    /// Written at most once per invocation, see `record`
    captured: Mutex<Option<R>>,
}

impl<'a, C, R> Dispatch<'a, C, R> {
    pub(crate) fn new(
        handlers: &'a [Arc<dyn Handler<C, R>>],
        outer: Option<&'a Next<'a, C, R>>,
    ) -> Self {
        Self {
            handlers,
            outer,
            entered: AtomicUsize::new(0),
            captured: Mutex::new(None),
        }
    }

    /// The captured result of this invocation.
    pub(crate) fn into_captured(self) -> Option<R> {
        self.captured
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Keep the value returned by the handler at `position` if it is the
    /// pipeline's result.
    ///
    /// That is the final slot's own return, or the return of a handler that
    /// completed without running its continuation. A handler that ran its
    /// continuation and absorbed a downstream failure never supplies the result.
    fn record(&self, position: usize, returned: Option<R>) {
        let final_slot = position + 1 == self.handlers.len();
        let short_circuited = self.entered.load(Ordering::Acquire) == position + 1;
        if !(final_slot || short_circuited) {
            return;
        }

        *self.captured.lock().unwrap_or_else(PoisonError::into_inner) = returned;
    }

    /// Claim `position` for this invocation; positions must strictly increase.
    fn enter(&self, position: usize) -> Result<(), PipelineError> {
        let previous = self.entered.fetch_max(position + 1, Ordering::AcqRel);
        if position < previous {
            return Err(PipelineError::DoubleNext { position });
        }
        Ok(())
    }
}

impl<'a, C: Send, R: Send> Dispatch<'a, C, R> {
    pub(crate) fn dispatch<'b>(
        &'b self,
        position: usize,
        ctx: &'b mut C,
    ) -> BoxFuture<'b, Result<(), PipelineError>> {
        Box::pin(async move {
            self.enter(position)?;

            let Some(handler) = self.handlers.get(position) else {
                // Past the last handler: hand over to whoever invoked this pipeline.
                if let Some(outer) = self.outer {
                    outer.run(ctx).await?;
                }
                return Ok(());
            };

            tracing::trace!(position, handler = handler.name(), "entering handler");

            let returned = handler.handle(ctx, Next::at(self, position + 1)).await?;

            tracing::trace!(position, handler = handler.name(), "handler completed");

            self.record(position, returned);
            Ok(())
        })
    }
}
