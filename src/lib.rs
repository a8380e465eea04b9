//! Harmonia: an onion-style middleware pipeline executor.
//!
//! A [`Pipeline`] runs an ordered list of [`Handler`]s against a mutable
//! context. Each handler gets a [`Next`] continuation for the rest of the
//! list; the pipeline resolves with the value returned by the handler in the
//! final slot. Pipelines are handlers themselves, so they nest.
//!
//! Pipelines can also be described in TOML ([`Config`]) and assembled from a
//! [`HandlerRegistry`] by a [`PipelineLoader`].

pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod middleware;
pub mod pipeline;

pub use config::{Config, ConfigError, LoggingConfig};
pub use error::{BoxError, PipelineError, Result};
pub use loader::PipelineLoader;
pub use middleware::{HandlerRegistry, MiddlewareInstance};
pub use pipeline::{
    handler_fn, sync_fn, terminal_fn, Handler, HandlerFuture, HandlerResult, Next, Pipeline,
    PipelineBuilder,
};
