//! Foreign references - ownership wrapper over one `PyObject` pointer
//!
//! Design: a single-owner value with three construction modes:
//! 1. `retain`   - the wrapper takes a new reference itself
//! 2. `adopt`    - the caller hands over a reference it already owns
//! 3. `borrowed` - unmanaged; never touches the count
//!
//! There is no `Clone`. `copy()` re-retains (or re-wraps an unmanaged
//! borrow) and `take()` hands the reference back across the boundary.

pub mod refcount;
mod shared;

pub use shared::SharedRef;

use core::fmt;
use core::ptr::NonNull;

use pyo3::ffi;

use crate::context::with_exclusive_access;

/// Host-side handle to one foreign object
pub struct ForeignRef {
    ptr: NonNull<ffi::PyObject>,
    managed: bool,
}

// Every operation on the pointee runs under exclusive access; the wrapper
// itself only carries a pointer and a flag.
unsafe impl Send for ForeignRef {}
unsafe impl Sync for ForeignRef {}

impl ForeignRef {
    /// Wrap `ptr`, taking a new reference
    ///
    /// # Safety
    /// - `ptr` must point to a live foreign object
    pub unsafe fn retain(ptr: NonNull<ffi::PyObject>) -> Self {
        with_exclusive_access(|| refcount::retain(ptr));
        Self { ptr, managed: true }
    }

    /// Wrap `ptr`, taking over a reference the caller already owns
    ///
    /// # Safety
    /// - `ptr` must carry a reference owned by the caller, which is
    ///   transferred to the wrapper
    #[inline]
    pub unsafe fn adopt(ptr: NonNull<ffi::PyObject>) -> Self {
        Self { ptr, managed: true }
    }

    /// Wrap `ptr` without participating in reference counting
    ///
    /// # Safety
    /// - The pointee must stay alive for as long as the wrapper and all of
    ///   its copies exist (immortal objects, or arguments owned by the
    ///   caller's frame)
    #[inline]
    pub unsafe fn borrowed(ptr: NonNull<ffi::PyObject>) -> Self {
        Self { ptr, managed: false }
    }

    /// New wrapper over the same object
    ///
    /// Managed wrappers retain once; unmanaged wrappers are re-wrapped.
    pub fn copy(&self) -> Self {
        if self.managed {
            unsafe { Self::retain(self.ptr) }
        } else {
            Self { ptr: self.ptr, managed: false }
        }
    }

    /// Consume the wrapper and return its pointer with one owned reference
    ///
    /// The wrapper's own release is cancelled; the caller must release the
    /// pointer or hand it onward. An unmanaged wrapper retains first so the
    /// caller always receives a reference it owns.
    pub fn take(self) -> NonNull<ffi::PyObject> {
        let ptr = self.ptr;
        if !self.managed {
            with_exclusive_access(|| unsafe { refcount::retain(ptr) });
        }
        core::mem::forget(self);
        ptr
    }

    /// `take()` as a raw pointer, for APIs that steal references
    #[inline]
    pub fn into_ptr(self) -> *mut ffi::PyObject {
        self.take().as_ptr()
    }

    /// Borrow the raw pointer
    #[inline]
    pub fn as_ptr(&self) -> *mut ffi::PyObject {
        self.ptr.as_ptr()
    }

    #[inline]
    pub fn as_non_null(&self) -> NonNull<ffi::PyObject> {
        self.ptr
    }

    /// Whether this wrapper owns a reference
    #[inline]
    pub fn is_managed(&self) -> bool {
        self.managed
    }

    /// Identity comparison (`is`), never content
    #[inline]
    pub fn is(&self, other: &ForeignRef) -> bool {
        self.ptr == other.ptr
    }

    /// The `None` singleton
    pub fn none() -> Self {
        with_exclusive_access(|| unsafe { Self::retain(NonNull::new_unchecked(ffi::Py_None())) })
    }

    pub fn is_none(&self) -> bool {
        with_exclusive_access(|| self.as_ptr() == unsafe { ffi::Py_None() })
    }

    /// Current foreign reference count (for debugging/testing)
    pub fn refcount(&self) -> isize {
        unsafe { refcount::count(self.ptr) }
    }
}

impl Drop for ForeignRef {
    fn drop(&mut self) {
        if self.managed {
            unsafe { refcount::release_or_defer(self.ptr) };
        }
    }
}

impl fmt::Debug for ForeignRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForeignRef")
            .field("ptr", &self.ptr)
            .field("managed", &self.managed)
            .field("repr", &self.repr_lossy())
            .finish()
    }
}

impl fmt::Display for ForeignRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.str_lossy())
    }
}

#[cfg(test)]
mod tests;
