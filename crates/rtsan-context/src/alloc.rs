//! Raw storage for per-thread contexts.
//!
//! Context storage must never come from `malloc`. Interceptors hook `malloc`
//! and ask the registry for the calling thread's context, so a thread whose
//! first context were malloc-backed would re-enter its own bootstrap. On unix
//! contexts live in anonymous private mappings obtained straight from the
//! kernel; elsewhere the C heap is used.

use std::alloc::Layout;
use std::ffi::c_void;
use std::ptr::NonNull;

use crate::context::Context;
use crate::error::ContextError;

/// Allocation capability the registry depends on.
///
/// Implementations never return null; failure is reported as
/// [`ContextError::Allocation`] and treated as fatal by the registry.
pub trait RawAllocator {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, ContextError>;

    /// # Safety
    ///
    /// `ptr` must come from `allocate` on this allocator with the same
    /// `layout`, and must not be used afterwards.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);
}

/// Allocator used for all registry storage. Never calls `malloc` on unix.
#[derive(Debug, Default, Clone, Copy)]
pub struct InternalAllocator;

#[cfg(unix)]
fn page_size() -> usize {
    // SAFETY: sysconf has no memory-safety preconditions.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 { size as usize } else { 4096 }
}

/// Bytes actually mapped for `layout`: the size rounded up to whole pages.
#[cfg(unix)]
fn mapping_len(layout: Layout) -> usize {
    let page = page_size();
    layout.size().max(1).div_ceil(page) * page
}

#[cfg(unix)]
impl RawAllocator for InternalAllocator {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, ContextError> {
        let failed = ContextError::Allocation {
            size: layout.size(),
            align: layout.align(),
        };
        // Mappings are page aligned and no stronger.
        if layout.align() > page_size() {
            return Err(failed);
        }
        // SAFETY: anonymous private mapping with no address hint; the kernel
        // returns zeroed pages or MAP_FAILED.
        let raw = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                mapping_len(layout),
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_ANON,
                -1,
                0,
            )
        };
        if raw == libc::MAP_FAILED {
            return Err(failed);
        }
        NonNull::new(raw.cast::<u8>()).ok_or(failed)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: caller guarantees `ptr` is a live mapping made by `allocate`
        // with this layout, so the length matches.
        unsafe { libc::munmap(ptr.as_ptr().cast::<c_void>(), mapping_len(layout)) };
    }
}

/// Alignment every `malloc` result satisfies on supported targets.
#[cfg(not(unix))]
const MALLOC_ALIGN: usize = 2 * std::mem::size_of::<usize>();

#[cfg(not(unix))]
impl RawAllocator for InternalAllocator {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, ContextError> {
        let failed = ContextError::Allocation {
            size: layout.size(),
            align: layout.align(),
        };
        if layout.align() > MALLOC_ALIGN {
            return Err(failed);
        }
        // SAFETY: plain C heap allocation of a non-zero size.
        let raw = unsafe { libc::malloc(layout.size().max(1)) };
        NonNull::new(raw.cast::<u8>()).ok_or(failed)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, _layout: Layout) {
        // SAFETY: caller guarantees `ptr` came from malloc above.
        unsafe { libc::free(ptr.as_ptr().cast::<c_void>()) };
    }
}

/// Allocate storage for one context and construct a zeroed [`Context`] in it.
pub fn allocate_context<A>(alloc: &A) -> Result<NonNull<Context>, ContextError>
where
    A: RawAllocator + ?Sized,
{
    let raw = alloc.allocate(Layout::new::<Context>())?.cast::<Context>();
    // SAFETY: `raw` is fresh, non-null, and sized/aligned for a Context.
    unsafe { raw.as_ptr().write(Context::new()) };
    Ok(raw)
}

/// Drop and free a context created by [`allocate_context`].
///
/// # Safety
///
/// `ctx` must come from `allocate_context` on the same allocator, must not be
/// released twice, and no reference to it may be used afterwards.
pub unsafe fn release_context<A>(alloc: &A, ctx: NonNull<Context>)
where
    A: RawAllocator + ?Sized,
{
    // SAFETY: forwarded caller contract.
    unsafe {
        std::ptr::drop_in_place(ctx.as_ptr());
        alloc.deallocate(ctx.cast::<u8>(), Layout::new::<Context>());
    }
}
