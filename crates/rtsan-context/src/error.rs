//! Failure modes of the context registry.
//!
//! None of these are recoverable for a consumer: a thread that cannot get a
//! context can no longer be sanitized correctly. They exist as values so the
//! bootstrap path can propagate with `?` up to the single place that turns
//! them into a fatal report (see [`crate::fatal::die`]). The one exception is
//! [`ContextError::SlotDestroyed`]: a lookup during thread teardown is served
//! an idle context instead.

use thiserror::Error;

/// Error raised while bootstrapping per-thread context storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContextError {
    /// The platform refused to create the process-wide thread-local key.
    #[error("thread-local key creation failed (code {code})")]
    KeyCreate { code: i32 },
    /// Storing the context address in the calling thread's slot failed.
    #[error("storing context in thread-local slot failed (code {code})")]
    SlotStore { code: i32 },
    /// The calling thread's slot was already torn down at thread exit.
    #[error("thread-local slot already destroyed")]
    SlotDestroyed,
    /// The raw allocator returned null.
    #[error("allocation of {size} bytes (align {align}) failed")]
    Allocation { size: usize, align: usize },
}
