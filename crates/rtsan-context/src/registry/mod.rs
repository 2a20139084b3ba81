//! Current-thread context lookup.
//!
//! One process-wide thread-local slot maps each thread to its own separately
//! allocated [`Context`]. The slot is created exactly once, on the first lookup
//! from any thread; a thread's context is created on that thread's first
//! lookup and reused until the thread exits, when it is released.
//!
//! - unix: a `pthread` key whose destructor frees the context at thread exit.
//! - elsewhere: a `thread_local!` owner that frees the context on drop.
//!
//! Any failure while bootstrapping is fatal; see [`crate::fatal::die`]. A
//! torn-down slot is the exception and is served an idle stand-in.

#[cfg(not(unix))]
mod native;
#[cfg(unix)]
mod pthread;

#[cfg(not(unix))]
use native as platform;
#[cfg(unix)]
use pthread as platform;

use std::cell::Cell;

use crate::context::Context;
use crate::error::ContextError;
use crate::fatal::{die, trace};

thread_local! {
    // Neither value needs drop, so access never registers a destructor,
    // allocates, or fails during teardown.
    static BOOTSTRAP_DEPTH: Cell<u32> = const { Cell::new(0) };
    static BOOTSTRAP_CONTEXT: Context = const { Context::new() };
}

/// Marks this thread as inside its first lookup.
struct BootstrapGuard;

impl BootstrapGuard {
    /// `None` if this thread is already bootstrapping.
    fn enter() -> Option<Self> {
        BOOTSTRAP_DEPTH.with(|depth| {
            if depth.get() > 0 {
                None
            } else {
                depth.set(1);
                Some(Self)
            }
        })
    }
}

impl Drop for BootstrapGuard {
    fn drop(&mut self) {
        BOOTSTRAP_DEPTH.with(|depth| depth.set(0));
    }
}

/// Idle stand-in served while the real context is unavailable.
fn bootstrap_context() -> &'static Context {
    let ctx = BOOTSTRAP_CONTEXT.with(|ctx| ctx as *const Context);
    // SAFETY: the value has no destructor and lives as long as the thread.
    unsafe { &*ctx }
}

/// The calling thread's context, created on first use.
///
/// `Context` is `!Sync`, so the returned reference cannot leave this thread.
///
/// Two cases are served a per-thread idle context (never realtime, never
/// bypassed) instead of the real one:
/// - a lookup made from inside this thread's first lookup, e.g. by an
///   allocator interceptor that runs while the slot is being set up;
/// - a lookup after this thread's slot has been torn down.
///
/// The reference must not be kept across thread-local teardown. Code that may
/// run there should use [`with_context`], or the `enter()` scope guards,
/// which re-resolve through [`existing_context`] when dropped.
///
/// Aborts the process if the slot cannot be created or the context cannot be
/// allocated.
#[must_use]
pub fn get_context_for_current_thread() -> &'static Context {
    if let Some(ctx) = platform::existing() {
        return ctx;
    }
    let Some(_bootstrap) = BootstrapGuard::enter() else {
        return bootstrap_context();
    };
    match platform::current() {
        Ok(ctx) => {
            trace(2, format_args!("using context {:p}", ctx));
            ctx
        }
        Err(ContextError::SlotDestroyed) => bootstrap_context(),
        Err(err) => die(err),
    }
}

/// The calling thread's context if it already exists.
///
/// Never allocates, never initializes, and returns `None` once the thread's
/// slot is gone.
#[must_use]
pub fn existing_context() -> Option<&'static Context> {
    platform::existing()
}

/// Run `f` with the calling thread's context.
pub fn with_context<F, R>(f: F) -> R
where
    F: FnOnce(&Context) -> R,
{
    f(get_context_for_current_thread())
}

/// Whether the process-wide slot has been created yet.
#[must_use]
pub fn is_initialized() -> bool {
    platform::is_initialized()
}
