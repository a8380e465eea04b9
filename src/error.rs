//! Error types for pipeline construction and execution

use thiserror::Error;

/// Boxed error carried verbatim for failures raised inside handlers
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Error types surfaced by building or running a pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid sequence: {0}")]
    InvalidSequence(String),

    #[error("Invalid handler at position {position}: {reason}")]
    InvalidHandler { position: usize, reason: String },

    #[error("Unknown pipeline '{0}'")]
    UnknownPipeline(String),

    #[error("next() called multiple times (position {position})")]
    DoubleNext { position: usize },

    /// Raised by a handler; displayed and sourced exactly as the original error
    #[error(transparent)]
    Handler(BoxError),
}

impl PipelineError {
    /// Wrap an error raised by a handler
    pub fn handler(err: impl Into<BoxError>) -> Self {
        Self::Handler(err.into())
    }

    /// Create a new invalid handler error
    pub fn invalid_handler(position: usize, reason: impl Into<String>) -> Self {
        Self::InvalidHandler {
            position,
            reason: reason.into(),
        }
    }

    /// Check whether a continuation was invoked more than once
    pub fn is_double_next(&self) -> bool {
        matches!(self, PipelineError::DoubleNext { .. })
    }

    /// Check if this error was reported while building a pipeline
    pub fn is_construction(&self) -> bool {
        matches!(
            self,
            PipelineError::InvalidSequence(_)
                | PipelineError::InvalidHandler { .. }
                | PipelineError::UnknownPipeline(_)
        )
    }

    /// The error raised by a handler, if that is what this is
    pub fn handler_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            PipelineError::Handler(err) => Some(err.as_ref()),
            _ => None,
        }
    }

    pub fn downcast_handler_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.handler_error().and_then(|err| err.downcast_ref::<E>())
    }

    /// Unwrap the handler error, giving back any other variant unchanged
    pub fn into_handler_error(self) -> std::result::Result<BoxError, Self> {
        match self {
            PipelineError::Handler(err) => Ok(err),
            other => Err(other),
        }
    }
}

impl From<String> for PipelineError {
    fn from(msg: String) -> Self {
        PipelineError::Handler(msg.into())
    }
}

impl From<&str> for PipelineError {
    fn from(msg: &str) -> Self {
        PipelineError::Handler(msg.into())
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::Handler(Box::new(err))
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Handler(Box::new(err))
    }
}

impl From<anyhow::Error> for PipelineError {
    fn from(err: anyhow::Error) -> Self {
        PipelineError::Handler(err.into())
    }
}
