pub mod executor;
pub mod handler;
pub mod next;

mod dispatch;


// Re-exports for convenience
pub use executor::{Pipeline, PipelineBuilder};
pub use handler::{
    handler_fn, sync_fn, terminal_fn, Handler, HandlerFn, HandlerFuture, HandlerResult, SyncFn,
    TerminalFn,
};
pub use next::Next;
