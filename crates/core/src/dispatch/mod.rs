//! The dispatch pipeline: debounced coalescing, routing, and the two
//! integration executors.

pub mod debounce;
pub mod engine;
pub mod http_call;
pub mod plugin_exec;
pub mod router;

pub use debounce::DebounceCoalescer;
pub use engine::{DispatchEngine, EngineHandle};
pub use http_call::HttpCallExecutor;
pub use plugin_exec::{PluginExecutor, PluginInvocation};
pub use router::DispatchRouter;
