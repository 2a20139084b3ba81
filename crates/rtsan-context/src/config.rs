//! Runtime configuration.
//!
//! Both knobs are read from the environment on first use and cached for the
//! rest of the process:
//! - `RTSAN_CONTEXT_LEAVE_POLICY`: what a leave does when the depth is already
//!   zero.
//!   - `unchecked` (default): plain wrapping decrement. An unmatched leave
//!     drives the counter negative and the caller owns the bug.
//!   - `clamp`: the decrement stops at zero.
//! - `RTSAN_CONTEXT_VERBOSITY`: `0` (default) is silent, `1` traces key and
//!   context lifecycle events to stderr, `2` additionally traces each
//!   thread's first lookup.
//!
//! Values are read with `getenv` and parsed in place. The first read can
//! happen inside the registry bootstrap, where an allocation would re-enter an
//! intercepted `malloc`.

use std::ffi::{CStr, c_char};
use std::sync::OnceLock;

/// Behavior of `leave_*` on a counter that is already at or below zero.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeavePolicy {
    /// Decrement unconditionally (wrapping). Unbalanced leaves go negative.
    #[default]
    Unchecked,
    /// Never decrement below zero.
    Clamp,
}

impl LeavePolicy {
    /// Parse from string (case-insensitive).
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        Self::from_bytes_loose(s.as_bytes())
    }

    /// Parse raw environment bytes (case-insensitive, no allocation).
    #[must_use]
    pub fn from_bytes_loose(raw: &[u8]) -> Self {
        let value = raw.trim_ascii();
        let is = |name: &str| value.eq_ignore_ascii_case(name.as_bytes());
        if is("clamp") || is("saturate") || is("floor") {
            Self::Clamp
        } else {
            Self::Unchecked
        }
    }

    /// Apply one leave step to `depth`.
    #[must_use]
    pub const fn step_down(self, depth: i32) -> i32 {
        match self {
            Self::Unchecked => depth.wrapping_sub(1),
            Self::Clamp => {
                if depth > 0 {
                    depth - 1
                } else {
                    depth
                }
            }
        }
    }
}

/// Highest meaningful verbosity level.
pub const MAX_VERBOSITY: u8 = 2;

/// Parse a verbosity value; anything unparsable is `0`, large values saturate.
#[must_use]
pub fn parse_verbosity(s: &str) -> u8 {
    s.trim()
        .parse::<u32>()
        .map(|v| v.min(u32::from(MAX_VERBOSITY)) as u8)
        .unwrap_or(0)
}

/// Borrow an environment variable's bytes without copying them.
///
/// `name` must be NUL-terminated.
fn env_bytes(name: &'static [u8]) -> Option<&'static [u8]> {
    let name = CStr::from_bytes_with_nul(name).ok()?;
    // SAFETY: `name` is a valid C string. The returned pointer is either null
    // or points into the process environment, which nothing in this crate
    // modifies.
    let value = unsafe { libc::getenv(name.as_ptr()) };
    if value.is_null() {
        return None;
    }
    // SAFETY: getenv returned a non-null NUL-terminated string.
    Some(unsafe { CStr::from_ptr(value.cast_const().cast::<c_char>()) }.to_bytes())
}

static GLOBAL_LEAVE_POLICY: OnceLock<LeavePolicy> = OnceLock::new();
static GLOBAL_VERBOSITY: OnceLock<u8> = OnceLock::new();

/// Configured leave policy (reads env var on first call, caches thereafter).
#[must_use]
pub fn leave_policy() -> LeavePolicy {
    *GLOBAL_LEAVE_POLICY.get_or_init(|| {
        env_bytes(b"RTSAN_CONTEXT_LEAVE_POLICY\0")
            .map(LeavePolicy::from_bytes_loose)
            .unwrap_or_default()
    })
}

/// Configured diagnostic verbosity.
#[must_use]
pub fn verbosity() -> u8 {
    *GLOBAL_VERBOSITY.get_or_init(|| {
        env_bytes(b"RTSAN_CONTEXT_VERBOSITY\0")
            .and_then(|v| std::str::from_utf8(v).ok())
            .map(parse_verbosity)
            .unwrap_or(0)
    })
}
