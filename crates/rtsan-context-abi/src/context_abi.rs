//! Realtime and bypass scope markers.
//!
//! Enter/exit calls must be paired on the same thread. Pairing is not
//! validated here; see `RTSAN_CONTEXT_LEAVE_POLICY` for how an unmatched exit
//! is handled.

use std::ffi::c_int;

use rtsan_context::get_context_for_current_thread;

#[inline]
fn flag(value: bool) -> c_int {
    c_int::from(value)
}

abi_fn! {
    /// Mark entry into a realtime function.
    fn __rtsan_realtime_enter() {
        get_context_for_current_thread().enter_realtime();
    }
}

abi_fn! {
    /// Mark exit from a realtime function.
    fn __rtsan_realtime_exit() {
        get_context_for_current_thread().leave_realtime();
    }
}

abi_fn! {
    /// Suppress checking on this thread until the matching `__rtsan_enable`.
    fn __rtsan_disable() {
        get_context_for_current_thread().enter_bypass();
    }
}

abi_fn! {
    /// Undo one `__rtsan_disable`.
    fn __rtsan_enable() {
        get_context_for_current_thread().leave_bypass();
    }
}

abi_fn! {
    fn __rtsan_is_realtime() -> c_int {
        flag(get_context_for_current_thread().is_in_realtime_context())
    }
}

abi_fn! {
    fn __rtsan_is_bypassed() -> c_int {
        flag(get_context_for_current_thread().is_bypassed())
    }
}

abi_fn! {
    /// 1 if an intercepted call on this thread should be checked.
    fn __rtsan_checks_active() -> c_int {
        flag(get_context_for_current_thread().checks_active())
    }
}
