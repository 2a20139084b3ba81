//! An interceptor that consults the current context from inside `malloc`
//! must not recurse while a thread's context is being created.
//!
//! This binary replaces the process `malloc` with a wrapper that, on threads
//! that opt in, records its own nesting depth and asks the registry whether
//! checks are active before forwarding to glibc. Keep this file to a single
//! test: the replacement applies to the whole process.

#![cfg(all(target_os = "linux", target_env = "gnu"))]

use std::cell::Cell;
use std::ffi::c_void;

use rtsan_context::{existing_context, get_context_for_current_thread};

unsafe extern "C" {
    fn __libc_malloc(size: usize) -> *mut c_void;
}

// Bound on nested interceptor calls before the wrapper stops consulting the
// registry, so a regression fails the assertion instead of the stack.
const NESTING_CAP: u32 = 8;

thread_local! {
    static TRACKING: Cell<bool> = const { Cell::new(false) };
    static NESTING: Cell<u32> = const { Cell::new(0) };
    static MAX_NESTING: Cell<u32> = const { Cell::new(0) };
    static SAW_ACTIVE: Cell<bool> = const { Cell::new(false) };
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn malloc(size: usize) -> *mut c_void {
    if TRACKING.with(Cell::get) {
        let depth = NESTING.with(|n| {
            n.set(n.get() + 1);
            n.get()
        });
        MAX_NESTING.with(|m| m.set(m.get().max(depth)));
        if depth <= NESTING_CAP && get_context_for_current_thread().checks_active() {
            SAW_ACTIVE.with(|s| s.set(true));
        }
        NESTING.with(|n| n.set(n.get() - 1));
    }
    // SAFETY: glibc's own allocator entry, never the symbol defined here.
    unsafe { __libc_malloc(size) }
}

#[test]
fn first_lookup_from_malloc_does_not_reenter() {
    let (max_nesting, created, saw_active) = std::thread::spawn(|| {
        TRACKING.with(|t| t.set(true));
        // SAFETY: plain allocation, released right below.
        let block = unsafe { libc::malloc(16) };
        let created = existing_context().is_some();
        TRACKING.with(|t| t.set(false));
        assert!(!block.is_null());
        // SAFETY: allocated above by malloc.
        unsafe { libc::free(block) };
        (MAX_NESTING.with(Cell::get), created, SAW_ACTIVE.with(Cell::get))
    })
    .join()
    .unwrap();

    assert_eq!(max_nesting, 1, "malloc re-entered while creating the context");
    assert!(created);
    assert!(!saw_active);
}
