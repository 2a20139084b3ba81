//! `thread_local!` backend for targets without `pthread` keys.

use std::cell::Cell;
use std::ptr::NonNull;

use parking_lot::Once;

use crate::alloc::{InternalAllocator, allocate_context, release_context};
use crate::context::Context;
use crate::error::ContextError;
use crate::fatal::trace;
use crate::metrics::{RegistryMetrics, global_metrics};

static KEY_ONCE: Once = Once::new();

/// Owns one thread's context and releases it when the thread exits.
struct ContextSlot {
    ctx: Cell<Option<NonNull<Context>>>,
}

impl ContextSlot {
    fn get_or_allocate(&self) -> Result<NonNull<Context>, ContextError> {
        if let Some(ctx) = self.ctx.get() {
            return Ok(ctx);
        }
        let ctx = allocate_context(&InternalAllocator)?;
        self.ctx.set(Some(ctx));
        RegistryMetrics::inc(&global_metrics().contexts_allocated);
        trace(1, format_args!("allocated context {:p}", ctx));
        Ok(ctx)
    }
}

impl Drop for ContextSlot {
    fn drop(&mut self) {
        if let Some(ctx) = self.ctx.take() {
            // SAFETY: the slot is the sole owner and is being destroyed.
            unsafe { release_context(&InternalAllocator, ctx) };
            RegistryMetrics::inc(&global_metrics().contexts_released);
            trace(1, format_args!("released context {:p}", ctx));
        }
    }
}

thread_local! {
    static CONTEXT_SLOT: ContextSlot = const {
        ContextSlot {
            ctx: Cell::new(None),
        }
    };
}

/// This thread's context if already allocated and the slot is still alive.
pub(super) fn existing() -> Option<&'static Context> {
    let ctx = CONTEXT_SLOT.try_with(|slot| slot.ctx.get()).ok()??;
    // SAFETY: owned by this thread's live slot.
    Some(unsafe { &*ctx.as_ptr() })
}

pub(super) fn current() -> Result<&'static Context, ContextError> {
    KEY_ONCE.call_once(|| {
        RegistryMetrics::inc(&global_metrics().key_inits);
        trace(1, format_args!("context slot ready"));
    });

    let ctx = CONTEXT_SLOT
        .try_with(ContextSlot::get_or_allocate)
        .map_err(|_| ContextError::SlotDestroyed)??;
    // SAFETY: the context is heap-backed and owned by this thread's slot until
    // the slot is dropped at thread exit.
    Ok(unsafe { &*ctx.as_ptr() })
}

pub(super) fn is_initialized() -> bool {
    KEY_ONCE.state().done()
}
