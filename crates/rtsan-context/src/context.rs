//! Per-thread nesting state.

use std::cell::Cell;

use crate::config::{LeavePolicy, leave_policy};

/// Realtime and bypass nesting depths for exactly one thread.
///
/// Counters live in [`Cell`]s so the registry can hand out shared references
/// while still allowing mutation. `Cell` also makes the type `!Sync`, so a
/// `&Context` can never be sent to another thread.
///
/// Arithmetic wraps: unbalanced use produces a wrong depth, never a panic.
#[derive(Debug, Default)]
pub struct Context {
    realtime_depth: Cell<i32>,
    bypass_depth: Cell<i32>,
}

impl Context {
    /// A context with both depths at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            realtime_depth: Cell::new(0),
            bypass_depth: Cell::new(0),
        }
    }

    pub fn enter_realtime(&self) {
        self.realtime_depth
            .set(self.realtime_depth.get().wrapping_add(1));
    }

    /// Leave one realtime level under the configured [`LeavePolicy`].
    pub fn leave_realtime(&self) {
        self.leave_realtime_with(leave_policy());
    }

    pub fn leave_realtime_with(&self, policy: LeavePolicy) {
        self.realtime_depth
            .set(policy.step_down(self.realtime_depth.get()));
    }

    pub fn enter_bypass(&self) {
        self.bypass_depth.set(self.bypass_depth.get().wrapping_add(1));
    }

    /// Leave one bypass level under the configured [`LeavePolicy`].
    pub fn leave_bypass(&self) {
        self.leave_bypass_with(leave_policy());
    }

    pub fn leave_bypass_with(&self, policy: LeavePolicy) {
        self.bypass_depth.set(policy.step_down(self.bypass_depth.get()));
    }

    #[must_use]
    pub fn is_in_realtime_context(&self) -> bool {
        self.realtime_depth.get() > 0
    }

    #[must_use]
    pub fn is_bypassed(&self) -> bool {
        self.bypass_depth.get() > 0
    }

    /// True when an intercepted call on this thread should be checked:
    /// inside a realtime region and not bypassed.
    #[must_use]
    pub fn checks_active(&self) -> bool {
        self.is_in_realtime_context() && !self.is_bypassed()
    }

    #[must_use]
    pub fn realtime_depth(&self) -> i32 {
        self.realtime_depth.get()
    }

    #[must_use]
    pub fn bypass_depth(&self) -> i32 {
        self.bypass_depth.get()
    }
}
