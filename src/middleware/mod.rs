pub mod instance;
pub mod registry;
pub mod types;

pub use instance::MiddlewareInstance;
pub use registry::{HandlerFactory, HandlerRegistry};
