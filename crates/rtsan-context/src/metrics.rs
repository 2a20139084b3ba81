//! Atomic counters for registry observability.
//!
//! All counters use relaxed ordering. They are diagnostic, not synchronization
//! primitives. Only lifecycle events are counted; the per-lookup hot path
//! touches no shared state.

use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide registry counters.
pub struct RegistryMetrics {
    /// Times the process-wide thread-local key was created (expected: 0 or 1).
    pub key_inits: AtomicU64,
    /// Per-thread contexts allocated.
    pub contexts_allocated: AtomicU64,
    /// Per-thread contexts released at thread exit.
    pub contexts_released: AtomicU64,
}

impl RegistryMetrics {
    /// Create a new zeroed metrics instance.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            key_inits: AtomicU64::new(0),
            contexts_allocated: AtomicU64::new(0),
            contexts_released: AtomicU64::new(0),
        }
    }

    /// Increment a counter by 1.
    pub fn inc(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Read a counter value.
    pub fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            key_inits: Self::get(&self.key_inits),
            contexts_allocated: Self::get(&self.contexts_allocated),
            contexts_released: Self::get(&self.contexts_released),
        }
    }
}

impl Default for RegistryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time snapshot of all registry counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricsSnapshot {
    pub key_inits: u64,
    pub contexts_allocated: u64,
    pub contexts_released: u64,
}

impl MetricsSnapshot {
    /// Contexts currently owned by live threads.
    #[must_use]
    pub fn live_contexts(&self) -> u64 {
        self.contexts_allocated
            .saturating_sub(self.contexts_released)
    }
}

static GLOBAL_METRICS: RegistryMetrics = RegistryMetrics::new();

/// Access the global metrics singleton.
#[must_use]
pub fn global_metrics() -> &'static RegistryMetrics {
    &GLOBAL_METRICS
}
