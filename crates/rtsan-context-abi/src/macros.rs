//! Helper macros for ABI function generation.
//!
//! Provides the `abi_fn!` macro that generates `#[unsafe(no_mangle)] pub extern "C" fn`
//! entry points over the calling thread's context.

/// Generate an exported `extern "C"` entry point.
///
/// # Usage
///
/// ```ignore
/// abi_fn! {
///     /// Doc comment for the function.
///     fn my_func() -> c_int {
///         // implementation body
///     }
/// }
/// ```
///
/// Every entry point here only touches the caller's own thread-local context,
/// so none of them take pointers and none of them need to be `unsafe`.
macro_rules! abi_fn {
    (
        $(#[$meta:meta])*
        fn $name:ident() -> $ret:ty
        $body:block
    ) => {
        $(#[$meta])*
        #[unsafe(no_mangle)]
        pub extern "C" fn $name() -> $ret $body
    };

    // Variant without return type (returns ())
    (
        $(#[$meta:meta])*
        fn $name:ident()
        $body:block
    ) => {
        $(#[$meta])*
        #[unsafe(no_mangle)]
        pub extern "C" fn $name() $body
    };
}

#[allow(unused_imports)]
pub(crate) use abi_fn;
