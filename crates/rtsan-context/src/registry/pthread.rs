//! `pthread` key backend.

use std::ffi::c_void;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicI32, AtomicU64, Ordering};

use parking_lot::Once;

use crate::alloc::{InternalAllocator, allocate_context, release_context};
use crate::context::Context;
use crate::error::ContextError;
use crate::fatal::trace;
use crate::metrics::{RegistryMetrics, global_metrics};

static KEY_ONCE: Once = Once::new();
// Written once inside KEY_ONCE, read-only afterwards.
static CONTEXT_KEY: AtomicU64 = AtomicU64::new(0);
static KEY_CREATE_STATUS: AtomicI32 = AtomicI32::new(0);

/// Key destructor: runs on the exiting thread with that thread's non-null value.
unsafe extern "C" fn release_thread_context(value: *mut c_void) {
    let Some(ctx) = NonNull::new(value.cast::<Context>()) else {
        return;
    };
    // SAFETY: the only values stored under CONTEXT_KEY come from
    // allocate_context on InternalAllocator, and pthread has already cleared
    // the slot, so nothing can reach this context again.
    unsafe { release_context(&InternalAllocator, ctx) };
    RegistryMetrics::inc(&global_metrics().contexts_released);
    trace(1, format_args!("released context {:p}", ctx));
}

fn context_key() -> Result<libc::pthread_key_t, ContextError> {
    KEY_ONCE.call_once(|| {
        let mut key: libc::pthread_key_t = 0;
        // SAFETY: `key` is a valid out-pointer; the destructor has the C ABI
        // signature pthread expects.
        let rc = unsafe { libc::pthread_key_create(&mut key, Some(release_thread_context)) };
        if rc != 0 {
            KEY_CREATE_STATUS.store(rc, Ordering::Release);
            return;
        }
        CONTEXT_KEY.store(key as u64, Ordering::Release);
        RegistryMetrics::inc(&global_metrics().key_inits);
        trace(1, format_args!("created context key {}", key as u64));
    });

    match KEY_CREATE_STATUS.load(Ordering::Acquire) {
        0 => Ok(CONTEXT_KEY.load(Ordering::Acquire) as libc::pthread_key_t),
        code => Err(ContextError::KeyCreate { code }),
    }
}

fn stored_context(key: libc::pthread_key_t) -> Option<&'static Context> {
    // SAFETY: `key` was created by pthread_key_create and is never deleted.
    let stored = unsafe { libc::pthread_getspecific(key) }.cast::<Context>();
    // SAFETY: a non-null slot holds a live context owned by this thread until
    // its key destructor runs, and pthread clears the slot before that.
    NonNull::new(stored).map(|ctx| unsafe { &*ctx.as_ptr() })
}

/// This thread's context if the key exists and the slot is filled.
/// Never allocates and never blocks.
pub(super) fn existing() -> Option<&'static Context> {
    if !is_initialized() {
        return None;
    }
    stored_context(CONTEXT_KEY.load(Ordering::Acquire) as libc::pthread_key_t)
}

pub(super) fn current() -> Result<&'static Context, ContextError> {
    let key = context_key()?;
    if let Some(ctx) = stored_context(key) {
        return Ok(ctx);
    }

    let ctx = allocate_context(&InternalAllocator)?;
    // SAFETY: valid key; the value is a pointer this thread owns.
    let rc = unsafe { libc::pthread_setspecific(key, ctx.as_ptr().cast::<c_void>().cast_const()) };
    if rc != 0 {
        // SAFETY: the context was never published, so this is its only owner.
        unsafe { release_context(&InternalAllocator, ctx) };
        return Err(ContextError::SlotStore { code: rc });
    }

    RegistryMetrics::inc(&global_metrics().contexts_allocated);
    trace(1, format_args!("allocated context {:p}", ctx));
    // SAFETY: just stored; lives until this thread's key destructor.
    Ok(unsafe { &*ctx.as_ptr() })
}

pub(super) fn is_initialized() -> bool {
    KEY_ONCE.state().done() && KEY_CREATE_STATUS.load(Ordering::Acquire) == 0
}
