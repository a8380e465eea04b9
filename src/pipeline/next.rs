use crate::error::PipelineError;
use crate::pipeline::dispatch::Dispatch;
use futures_util::future::BoxFuture;
use std::fmt;

/// Continuation handed to a handler, bound to the position after it.
///
/// `next.run(ctx)` runs everything downstream and resolves once that whole
/// subtree has unwound. It resolves to `()`: the downstream return values are
/// tracked by the pipeline, never passed back through the continuation.
pub struct Next<'a, C, R> {
    link: Link<'a, C, R>,
}

enum Link<'a, C, R> {
    Position {
        dispatch: &'a Dispatch<'a, C, R>,
        position: usize,
    },
    End,
}

impl<'a, C, R> Next<'a, C, R> {
    pub(crate) fn at(dispatch: &'a Dispatch<'a, C, R>, position: usize) -> Self {
        Self {
            link: Link::Position { dispatch, position },
        }
    }

    /// A continuation with nothing behind it; running it completes immediately.
    pub fn end() -> Self {
        Self { link: Link::End }
    }

    pub fn is_end(&self) -> bool {
        matches!(self.link, Link::End)
    }
}

impl<'a, C: Send, R: Send> Next<'a, C, R> {
    /// Run the remainder of the pipeline against `ctx`.
    ///
    /// Fails with [`PipelineError::DoubleNext`] if this continuation was
    /// already run during the current invocation.
    pub fn run<'b>(&'b self, ctx: &'b mut C) -> BoxFuture<'b, Result<(), PipelineError>> {
        match &self.link {
            Link::Position { dispatch, position } => dispatch.dispatch(*position, ctx),
            Link::End => Box::pin(async { Ok(()) }),
        }
    }
}

impl<C, R> fmt::Debug for Next<'_, C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.link {
            Link::Position { position, .. } => {
                f.debug_struct("Next").field("position", position).finish()
            }
            Link::End => f.write_str("Next::End"),
        }
    }
}
