//! Attribute access

use std::ffi::CString;

use pyo3::ffi;

use crate::context::with_exclusive_access;
use crate::error::{check_ptr, check_status, tracked, ExceptionKind, PyError, PyResult};
use crate::object::ForeignRef;

fn attr_name(name: &str) -> PyResult<CString> {
    CString::new(name).map_err(|_| PyError::new(ExceptionKind::ValueError, "attribute name contains a NUL byte"))
}

impl ForeignRef {
    /// `obj.name`
    pub fn getattr(&self, name: &str) -> PyResult<ForeignRef> {
        let name = attr_name(name)?;
        with_exclusive_access(|| unsafe { check_ptr(ffi::PyObject_GetAttrString(self.as_ptr(), name.as_ptr())) })
    }

    /// `obj.name = value`
    pub fn setattr(&self, name: &str, value: &ForeignRef) -> PyResult<()> {
        let name = attr_name(name)?;
        with_exclusive_access(|| {
            check_status(unsafe { ffi::PyObject_SetAttrString(self.as_ptr(), name.as_ptr(), value.as_ptr()) })
                .map(drop)
        })
    }

    /// `del obj.name`
    pub fn delattr(&self, name: &str) -> PyResult<()> {
        let name = attr_name(name)?;
        with_exclusive_access(|| {
            // A null value deletes
            check_status(unsafe {
                ffi::PyObject_SetAttrString(self.as_ptr(), name.as_ptr(), core::ptr::null_mut())
            })
            .map(drop)
        })
    }

    /// `hasattr(obj, name)`; lookup errors count as absent
    pub fn hasattr(&self, name: &str) -> bool {
        let Ok(name) = attr_name(name) else {
            return false;
        };
        with_exclusive_access(|| unsafe { ffi::PyObject_HasAttrString(self.as_ptr(), name.as_ptr()) != 0 })
    }

    /// `obj.name` with failures reported to the tracking scope
    ///
    /// # Panics
    /// On failure when no tracking scope is open.
    pub fn attr(&self, name: &str) -> Option<ForeignRef> {
        tracked(self.getattr(name).map(Some), || None)
    }
}
