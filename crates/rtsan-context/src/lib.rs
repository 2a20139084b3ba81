//! Per-thread execution context for the realtime sanitizer.
//!
//! Interceptors ask two questions on every intercepted call: is this thread
//! inside a region declared realtime, and is checking suppressed here? Both
//! answers live in a per-thread [`Context`] of nesting depths, found through
//! a lock-free thread-local registry.
//!
//! # Architecture
//!
//! - **Context** (`context`): realtime and bypass depth counters
//! - **Registry** (`registry`): lazily created per-thread storage, one
//!   process-wide key, cleanup at thread exit
//! - **Allocator** (`alloc`): malloc-free storage capability for contexts
//! - **Scopes** (`scope`): RAII guards over enter/leave pairs
//! - **Configuration** (`config`): leave policy and verbosity from env
//! - **Metrics** (`metrics`): atomic counters for observability
//! - **Fatal reporting** (`fatal`): allocation-free stderr output and abort
//!
//! ```
//! use rtsan_context::{ScopedRealtime, get_context_for_current_thread};
//!
//! let _rt = ScopedRealtime::enter();
//! let ctx = get_context_for_current_thread();
//! assert!(ctx.is_in_realtime_context());
//! assert!(ctx.checks_active());
//! ```

pub mod alloc;
pub mod config;
pub mod context;
pub mod error;
pub mod fatal;
pub mod metrics;
pub mod registry;
pub mod scope;

pub use config::LeavePolicy;
pub use context::Context;
pub use error::ContextError;
pub use metrics::{MetricsSnapshot, RegistryMetrics, global_metrics};
pub use registry::{
    existing_context, get_context_for_current_thread, is_initialized, with_context,
};
pub use scope::{ScopedBypass, ScopedRealtime, bypassed, in_realtime};
