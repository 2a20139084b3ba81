//! RAII scopes over a [`Context`].
//!
//! A guard enters its region when created and leaves it when dropped, so an
//! early return or a panic unwinding through the scope still restores the
//! depth. Guards never leave the thread that created them.
//!
//! Guards made with `enter()` do not keep the context reference. Their `Drop`
//! looks the context up again with [`existing_context`], so a guard that
//! outlives the thread's slot (held in another thread-local that is destroyed
//! later) leaves nothing instead of touching freed storage.

use std::marker::PhantomData;

use crate::context::Context;
use crate::registry::{existing_context, get_context_for_current_thread};

/// Realtime region held for the guard's lifetime.
#[must_use = "the realtime region ends when the guard is dropped"]
pub struct ScopedRealtime<'a> {
    // `None`: the calling thread's context, resolved again on drop.
    ctx: Option<&'a Context>,
    _not_send: PhantomData<*const ()>,
}

impl<'a> ScopedRealtime<'a> {
    /// Enter a realtime region on an explicit context.
    pub fn new(ctx: &'a Context) -> Self {
        ctx.enter_realtime();
        Self {
            ctx: Some(ctx),
            _not_send: PhantomData,
        }
    }
}

impl ScopedRealtime<'static> {
    /// Enter a realtime region on the calling thread's context.
    pub fn enter() -> Self {
        get_context_for_current_thread().enter_realtime();
        Self {
            ctx: None,
            _not_send: PhantomData,
        }
    }
}

impl Drop for ScopedRealtime<'_> {
    fn drop(&mut self) {
        if let Some(ctx) = self.ctx.or_else(|| existing_context()) {
            ctx.leave_realtime();
        }
    }
}

/// Checking suppressed for the guard's lifetime.
#[must_use = "the bypass ends when the guard is dropped"]
pub struct ScopedBypass<'a> {
    ctx: Option<&'a Context>,
    _not_send: PhantomData<*const ()>,
}

impl<'a> ScopedBypass<'a> {
    /// Enter a bypass scope on an explicit context.
    pub fn new(ctx: &'a Context) -> Self {
        ctx.enter_bypass();
        Self {
            ctx: Some(ctx),
            _not_send: PhantomData,
        }
    }
}

impl ScopedBypass<'static> {
    /// Enter a bypass scope on the calling thread's context.
    pub fn enter() -> Self {
        get_context_for_current_thread().enter_bypass();
        Self {
            ctx: None,
            _not_send: PhantomData,
        }
    }
}

impl Drop for ScopedBypass<'_> {
    fn drop(&mut self) {
        if let Some(ctx) = self.ctx.or_else(|| existing_context()) {
            ctx.leave_bypass();
        }
    }
}

/// Run `f` inside a realtime region on the calling thread.
pub fn in_realtime<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    let _scope = ScopedRealtime::enter();
    f()
}

/// Run `f` with checking suppressed on the calling thread.
pub fn bypassed<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    let _scope = ScopedBypass::enter();
    f()
}
