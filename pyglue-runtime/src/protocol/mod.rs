//! Object protocol façade - the consumer-facing surface of `ForeignRef`
//!
//! Design: every operation runs under exclusive access, performs one C-level
//! call, adopts a non-null result and otherwise takes the pending exception.
//! The ergonomic accessors (`attr`, `item`, operators, iteration) have no
//! error channel and report into the tracked error scope instead.
//!
//! Architecture:
//! - `attr.rs`    - attribute access
//! - `item.rs`    - item, sequence and mapping access
//! - `call.rs`    - calls, tuples and dicts
//! - `compare.rs` - rich comparison and operator impls
//! - `iter.rs`    - lazily pulled iteration

mod attr;
mod call;
mod compare;
mod item;
mod iter;

pub use call::{dict, tuple};
pub use compare::CompareOp;
pub use iter::ForeignIter;

use core::ptr;
use std::ffi::CStr;

use pyo3::ffi;

use crate::context::with_exclusive_access;
use crate::convert::FromForeign;
use crate::error::{check_ptr, check_status, PyResult};
use crate::object::ForeignRef;

impl ForeignRef {
    /// `str(obj)`
    pub fn str(&self) -> PyResult<String> {
        with_exclusive_access(|| unsafe {
            let text = check_ptr(ffi::PyObject_Str(self.as_ptr()))?;
            String::from_foreign(&text)
        })
    }

    /// `repr(obj)`
    pub fn repr(&self) -> PyResult<String> {
        with_exclusive_access(|| unsafe {
            let text = check_ptr(ffi::PyObject_Repr(self.as_ptr()))?;
            String::from_foreign(&text)
        })
    }

    /// Name of the object's type, e.g. `"int"`
    pub fn type_name(&self) -> String {
        with_exclusive_access(|| unsafe {
            let tp = ffi::Py_TYPE(self.as_ptr());
            CStr::from_ptr((*tp).tp_name).to_string_lossy().into_owned()
        })
    }

    /// The object's type object
    pub fn get_type(&self) -> ForeignRef {
        with_exclusive_access(|| unsafe {
            let tp = ffi::Py_TYPE(self.as_ptr()).cast::<ffi::PyObject>();
            ForeignRef::retain(ptr::NonNull::new_unchecked(tp))
        })
    }

    /// `bool(obj)`
    pub fn is_truthy(&self) -> PyResult<bool> {
        with_exclusive_access(|| {
            check_status(unsafe { ffi::PyObject_IsTrue(self.as_ptr()) }).map(|r| r == 1)
        })
    }

    /// `isinstance(obj, class)`
    pub fn is_instance(&self, class: &ForeignRef) -> PyResult<bool> {
        with_exclusive_access(|| {
            check_status(unsafe { ffi::PyObject_IsInstance(self.as_ptr(), class.as_ptr()) })
                .map(|r| r == 1)
        })
    }

    pub fn is_callable(&self) -> bool {
        with_exclusive_access(|| unsafe { ffi::PyCallable_Check(self.as_ptr()) != 0 })
    }

    /// `str(obj)` for diagnostics; never raises and leaves any pending
    /// exception untouched
    pub fn str_lossy(&self) -> String {
        preserving_error_state(|| self.str().unwrap_or_else(|_| "<unprintable object>".to_string()))
    }

    /// `repr(obj)` for diagnostics; never raises
    pub fn repr_lossy(&self) -> String {
        preserving_error_state(|| self.repr().unwrap_or_else(|_| "<unprintable object>".to_string()))
    }
}

/// Run `body` with the pending-exception slot saved and restored around it
pub(crate) fn preserving_error_state<R>(body: impl FnOnce() -> R) -> R {
    with_exclusive_access(|| unsafe {
        let mut kind = ptr::null_mut();
        let mut value = ptr::null_mut();
        let mut traceback = ptr::null_mut();
        ffi::PyErr_Fetch(&mut kind, &mut value, &mut traceback);

        let result = body();

        // Anything `body` left behind is noise
        ffi::PyErr_Clear();
        ffi::PyErr_Restore(kind, value, traceback);
        result
    })
}

#[cfg(test)]
mod tests;
