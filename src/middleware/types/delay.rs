use crate::pipeline::{Handler, HandlerResult, Next};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct DelayConfig {
    pub millis: u64,
}

/// Waits before handing control downstream
pub struct DelayMiddleware {
    delay: Duration,
}

impl DelayMiddleware {
    pub fn new(config: DelayConfig) -> Self {
        Self {
            delay: Duration::from_millis(config.millis),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[async_trait]
impl<C: Send, R: Send> Handler<C, R> for DelayMiddleware {
    async fn handle<'a>(&'a self, ctx: &'a mut C, next: Next<'a, C, R>) -> HandlerResult<R> {
        tokio::time::sleep(self.delay).await;
        next.run(ctx).await?;
        Ok(None)
    }

    fn name(&self) -> &str {
        "delay"
    }
}

/// Parse configuration from HashMap for middleware registry
pub fn parse_config(options: &HashMap<String, Value>) -> Result<DelayConfig, String> {
    let millis = options
        .get("millis")
        .and_then(|v| v.as_u64())
        .ok_or("Missing or invalid 'millis' for delay middleware")?;

    Ok(DelayConfig { millis })
}
