use crate::pipeline::{Handler, HandlerResult, Next};
use async_trait::async_trait;

/// Ends the chain here: downstream handlers never run
pub struct HaltMiddleware;

impl Default for HaltMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl HaltMiddleware {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl<C: Send, R: Send> Handler<C, R> for HaltMiddleware {
    async fn handle<'a>(&'a self, _ctx: &'a mut C, _next: Next<'a, C, R>) -> HandlerResult<R> {
        tracing::debug!("halt middleware short-circuiting the chain");
        Ok(None)
    }

    fn name(&self) -> &str {
        "halt"
    }
}
