use crate::pipeline::{Handler, HandlerResult, Next};
use async_trait::async_trait;

/// Calls the continuation and contributes no value of its own
pub struct PassthruMiddleware;

impl Default for PassthruMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl PassthruMiddleware {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl<C: Send, R: Send> Handler<C, R> for PassthruMiddleware {
    async fn handle<'a>(&'a self, ctx: &'a mut C, next: Next<'a, C, R>) -> HandlerResult<R> {
        next.run(ctx).await?;
        Ok(None)
    }

    fn name(&self) -> &str {
        "passthru"
    }
}
