use crate::pipeline::{Handler, HandlerResult, Next};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::Instrument;

#[derive(Debug, Deserialize, Clone)]
pub struct TraceConfig {
    /// Label recorded on the span, e.g. the route or pipeline being timed
    pub label: String,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            label: "trace".to_string(),
        }
    }
}

/// Wraps everything downstream in a span and logs how long it took
pub struct TraceMiddleware {
    config: TraceConfig,
}

impl TraceMiddleware {
    pub fn new(config: TraceConfig) -> Self {
        Self { config }
    }

    pub fn label(&self) -> &str {
        &self.config.label
    }
}

#[async_trait]
impl<C: Send, R: Send> Handler<C, R> for TraceMiddleware {
    async fn handle<'a>(&'a self, ctx: &'a mut C, next: Next<'a, C, R>) -> HandlerResult<R> {
        let span = tracing::info_span!("middleware", label = %self.config.label);

        async move {
            let started = Instant::now();
            let outcome = next.run(ctx).await;
            let elapsed_ms = elapsed_millis(started.elapsed());

            match &outcome {
                Ok(()) => tracing::debug!(elapsed_ms, "downstream completed"),
                Err(err) => tracing::warn!(elapsed_ms, error = %err, "downstream failed"),
            }

            outcome?;
            Ok(None)
        }
        .instrument(span)
        .await
    }

    fn name(&self) -> &str {
        "trace"
    }
}

/// Whole milliseconds in `elapsed`, saturating at `u64::MAX`
fn elapsed_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Parse configuration from HashMap for middleware registry
pub fn parse_config(options: &HashMap<String, Value>) -> Result<TraceConfig, String> {
    match options.get("label") {
        None => Ok(TraceConfig::default()),
        Some(value) => {
            let label = value
                .as_str()
                .ok_or("'label' for trace middleware must be a string")?;
            if label.trim().is_empty() {
                return Err("'label' for trace middleware must not be empty".to_string());
            }
            Ok(TraceConfig {
                label: label.to_string(),
            })
        }
    }
}
