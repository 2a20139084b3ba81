//! # rtsan-context-abi
//!
//! C entry points for instrumented code over the per-thread sanitizer context.
//!
//! This crate produces a `cdylib` exposing the `__rtsan_*` realtime and bypass
//! scope markers a compiler pass or a hand-instrumented C/C++ program calls
//! around realtime functions and known-safe sections.
//!
//! # Architecture
//!
//! ```text
//! instrumented code -> ABI entry (this crate) -> current thread's Context
//! interceptor       -> __rtsan_checks_active  -> report / pass through
//! ```

#[macro_use]
mod macros;

pub mod context_abi;
