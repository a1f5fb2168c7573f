//! Calls, argument tuples and keyword dicts

use std::ffi::CString;

use pyo3::ffi;

use crate::context::with_exclusive_access;
use crate::convert::IntoForeign;
use crate::error::{check_ptr, check_status, ExceptionKind, PyError, PyResult};
use crate::object::ForeignRef;

/// Build a tuple holding a new reference to each of `items`
pub fn tuple(items: &[ForeignRef]) -> PyResult<ForeignRef> {
    with_exclusive_access(|| unsafe {
        let tuple = check_ptr(ffi::PyTuple_New(items.len() as ffi::Py_ssize_t))?;
        for (index, item) in items.iter().enumerate() {
            // PyTuple_SetItem steals
            ffi::PyTuple_SetItem(tuple.as_ptr(), index as ffi::Py_ssize_t, item.copy().into_ptr());
        }
        Ok(tuple)
    })
}

/// Build a dict from string keys
pub fn dict<K: AsRef<str>, V: IntoForeign>(entries: impl IntoIterator<Item = (K, V)>) -> PyResult<ForeignRef> {
    with_exclusive_access(|| unsafe {
        let dict = check_ptr(ffi::PyDict_New())?;
        for (key, value) in entries {
            let key = CString::new(key.as_ref())
                .map_err(|_| PyError::new(ExceptionKind::ValueError, "dict key contains a NUL byte"))?;
            let value = value.into_foreign()?;
            check_status(ffi::PyDict_SetItemString(dict.as_ptr(), key.as_ptr(), value.as_ptr()))?;
        }
        Ok(dict)
    })
}

impl ForeignRef {
    /// `obj()`
    pub fn call0(&self) -> PyResult<ForeignRef> {
        with_exclusive_access(|| unsafe { check_ptr(ffi::PyObject_CallObject(self.as_ptr(), core::ptr::null_mut())) })
    }

    /// `obj(*args)`
    pub fn call(&self, args: &[ForeignRef]) -> PyResult<ForeignRef> {
        with_exclusive_access(|| {
            let args = tuple(args)?;
            unsafe { check_ptr(ffi::PyObject_Call(self.as_ptr(), args.as_ptr(), core::ptr::null_mut())) }
        })
    }

    /// `obj(*args, **kwargs)`
    pub fn call_with_kwargs(&self, args: &[ForeignRef], kwargs: &[(&str, ForeignRef)]) -> PyResult<ForeignRef> {
        with_exclusive_access(|| {
            let args = tuple(args)?;
            let kwargs = dict(kwargs.iter().map(|(key, value)| (*key, value)))?;
            unsafe { check_ptr(ffi::PyObject_Call(self.as_ptr(), args.as_ptr(), kwargs.as_ptr())) }
        })
    }

    /// `obj.name(*args)`
    pub fn call_method(&self, name: &str, args: &[ForeignRef]) -> PyResult<ForeignRef> {
        self.getattr(name)?.call(args)
    }
}
