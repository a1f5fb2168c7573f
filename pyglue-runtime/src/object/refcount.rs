//! Reference counting - the only code that touches foreign counts
//!
//! Hot path operations are inlined. Releases requested by a thread that does
//! not hold execution access are queued and drained by the next thread that
//! acquires it, so dropping a `ForeignRef` never blocks.

use core::ptr::NonNull;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use pyo3::ffi;

use crate::context;
use crate::logging::log_deferred_release;

/// Pointer waiting for a release under execution access
struct PendingRelease(NonNull<ffi::PyObject>);

// The pointee is only touched by `drain_pending`, which runs with access held.
unsafe impl Send for PendingRelease {}

static PENDING: Mutex<Vec<PendingRelease>> = parking_lot::const_mutex(Vec::new());
static DIRTY: AtomicBool = AtomicBool::new(false);

/// Increment reference count (hot path, always inlined)
///
/// # Safety
/// - `ptr` must point to a live foreign object
/// - The calling thread must hold execution access
#[inline(always)]
pub unsafe fn retain(ptr: NonNull<ffi::PyObject>) {
    ffi::Py_IncRef(ptr.as_ptr());
}

/// Decrement reference count; the object may be destroyed
///
/// # Safety
/// - `ptr` must carry a reference owned by the caller
/// - The calling thread must hold execution access
#[inline(always)]
pub unsafe fn release(ptr: NonNull<ffi::PyObject>) {
    ffi::Py_DecRef(ptr.as_ptr());
}

/// Release now if access is held, otherwise queue the release
///
/// # Safety
/// - `ptr` must carry a reference owned by the caller
pub(crate) unsafe fn release_or_defer(ptr: NonNull<ffi::PyObject>) {
    if context::is_held() {
        release(ptr);
    } else {
        defer_release(ptr);
    }
}

#[cold]
fn defer_release(ptr: NonNull<ffi::PyObject>) {
    log_deferred_release(ptr.as_ptr() as *const u8);
    PENDING.lock().push(PendingRelease(ptr));
    DIRTY.store(true, Ordering::Release);
}

/// Apply queued releases; returns how many were applied
///
/// Must be called with execution access held.
pub(crate) fn drain_pending() -> usize {
    if !DIRTY.swap(false, Ordering::AcqRel) {
        return 0;
    }

    let pending = std::mem::take(&mut *PENDING.lock());
    for PendingRelease(ptr) in &pending {
        unsafe { release(*ptr) };
    }
    pending.len()
}

/// Number of releases currently queued (for debugging/testing)
pub fn pending_releases() -> usize {
    PENDING.lock().len()
}

/// Current foreign reference count (for debugging/testing)
///
/// # Safety
/// - `ptr` must point to a live foreign object
pub unsafe fn count(ptr: NonNull<ffi::PyObject>) -> isize {
    context::with_exclusive_access(|| ffi::Py_REFCNT(ptr.as_ptr()) as isize)
}
