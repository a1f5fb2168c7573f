//! Value conversion - host values ↔ foreign objects
//!
//! Design: two traits, both fallible. Extraction checks the runtime type tag
//! first and reports a mismatch as `PyError::BadType`; numeric range and
//! encoding failures come back as the interpreter's own exceptions.

use core::ptr::NonNull;
use std::os::raw::c_long;

use pyo3::ffi;

use crate::context::with_exclusive_access;
use crate::error::{check_ptr, fetch, ExceptionKind, PyError, PyResult};
use crate::logging::log_conversion_failure;
use crate::object::ForeignRef;

/// Build a host value from a foreign object
pub trait FromForeign: Sized {
    fn from_foreign(obj: &ForeignRef) -> PyResult<Self>;
}

/// Turn a host value into a new foreign reference
pub trait IntoForeign {
    fn into_foreign(self) -> PyResult<ForeignRef>;
}

/// Convert `obj` to `T`
#[inline]
pub fn extract<T: FromForeign>(obj: &ForeignRef) -> PyResult<T> {
    T::from_foreign(obj)
}

fn bad_type(expected: &'static str, obj: &ForeignRef) -> PyError {
    let found = obj.type_name();
    log_conversion_failure(expected, &found);
    PyError::BadType { expected, found }
}

impl FromForeign for ForeignRef {
    /// Always a managed reference: the source may be an argument borrow
    /// that dies with the caller's frame
    fn from_foreign(obj: &ForeignRef) -> PyResult<Self> {
        Ok(unsafe { ForeignRef::retain(obj.as_non_null()) })
    }
}

impl IntoForeign for ForeignRef {
    fn into_foreign(self) -> PyResult<ForeignRef> {
        Ok(self)
    }
}

impl IntoForeign for &ForeignRef {
    fn into_foreign(self) -> PyResult<ForeignRef> {
        Ok(unsafe { ForeignRef::retain(self.as_non_null()) })
    }
}

impl FromForeign for String {
    fn from_foreign(obj: &ForeignRef) -> PyResult<Self> {
        with_exclusive_access(|| unsafe {
            if ffi::PyUnicode_Check(obj.as_ptr()) == 0 {
                return Err(bad_type("str", obj));
            }

            let mut size: ffi::Py_ssize_t = 0;
            let data = ffi::PyUnicode_AsUTF8AndSize(obj.as_ptr(), &mut size);
            if data.is_null() {
                return Err(fetch().unwrap_or_else(PyError::unknown));
            }

            let bytes = std::slice::from_raw_parts(data.cast::<u8>(), size as usize);
            Ok(String::from_utf8_lossy(bytes).into_owned())
        })
    }
}

impl IntoForeign for &str {
    fn into_foreign(self) -> PyResult<ForeignRef> {
        with_exclusive_access(|| unsafe {
            check_ptr(ffi::PyUnicode_FromStringAndSize(
                self.as_ptr().cast(),
                self.len() as ffi::Py_ssize_t,
            ))
        })
    }
}

impl IntoForeign for String {
    fn into_foreign(self) -> PyResult<ForeignRef> {
        self.as_str().into_foreign()
    }
}

impl FromForeign for i64 {
    fn from_foreign(obj: &ForeignRef) -> PyResult<Self> {
        with_exclusive_access(|| unsafe {
            if ffi::PyLong_Check(obj.as_ptr()) == 0 {
                return Err(bad_type("int", obj));
            }

            let value = ffi::PyLong_AsLongLong(obj.as_ptr());
            if value == -1 {
                if let Some(error) = fetch() {
                    return Err(error);
                }
            }
            Ok(value)
        })
    }
}

impl IntoForeign for i64 {
    fn into_foreign(self) -> PyResult<ForeignRef> {
        with_exclusive_access(|| unsafe { check_ptr(ffi::PyLong_FromLongLong(self)) })
    }
}

impl FromForeign for i32 {
    fn from_foreign(obj: &ForeignRef) -> PyResult<Self> {
        let value = i64::from_foreign(obj)?;
        i32::try_from(value).map_err(|_| {
            PyError::new(ExceptionKind::OverflowError, format!("{value} does not fit in a 32-bit integer"))
        })
    }
}

impl IntoForeign for i32 {
    fn into_foreign(self) -> PyResult<ForeignRef> {
        i64::from(self).into_foreign()
    }
}

impl FromForeign for usize {
    fn from_foreign(obj: &ForeignRef) -> PyResult<Self> {
        let value = i64::from_foreign(obj)?;
        usize::try_from(value).map_err(|_| {
            PyError::new(ExceptionKind::OverflowError, format!("{value} is not a valid size"))
        })
    }
}

impl IntoForeign for usize {
    fn into_foreign(self) -> PyResult<ForeignRef> {
        with_exclusive_access(|| unsafe { check_ptr(ffi::PyLong_FromUnsignedLongLong(self as u64)) })
    }
}

impl FromForeign for f64 {
    fn from_foreign(obj: &ForeignRef) -> PyResult<Self> {
        with_exclusive_access(|| unsafe {
            let ptr = obj.as_ptr();
            // Like the interpreter itself, accept ints where floats are expected
            if ffi::PyFloat_Check(ptr) == 0 && ffi::PyLong_Check(ptr) == 0 {
                return Err(bad_type("float", obj));
            }

            let value = ffi::PyFloat_AsDouble(ptr);
            if value == -1.0 {
                if let Some(error) = fetch() {
                    return Err(error);
                }
            }
            Ok(value)
        })
    }
}

impl IntoForeign for f64 {
    fn into_foreign(self) -> PyResult<ForeignRef> {
        with_exclusive_access(|| unsafe { check_ptr(ffi::PyFloat_FromDouble(self)) })
    }
}

impl FromForeign for bool {
    fn from_foreign(obj: &ForeignRef) -> PyResult<Self> {
        with_exclusive_access(|| unsafe {
            if ffi::PyBool_Check(obj.as_ptr()) == 0 {
                return Err(bad_type("bool", obj));
            }
            Ok(obj.as_ptr() == ffi::Py_True())
        })
    }
}

impl IntoForeign for bool {
    fn into_foreign(self) -> PyResult<ForeignRef> {
        with_exclusive_access(|| unsafe { check_ptr(ffi::PyBool_FromLong(c_long::from(self))) })
    }
}

impl FromForeign for () {
    fn from_foreign(obj: &ForeignRef) -> PyResult<Self> {
        if obj.is_none() {
            Ok(())
        } else {
            Err(bad_type("None", obj))
        }
    }
}

impl IntoForeign for () {
    fn into_foreign(self) -> PyResult<ForeignRef> {
        Ok(ForeignRef::none())
    }
}

impl<T: FromForeign> FromForeign for Option<T> {
    fn from_foreign(obj: &ForeignRef) -> PyResult<Self> {
        if obj.is_none() {
            Ok(None)
        } else {
            T::from_foreign(obj).map(Some)
        }
    }
}

impl<T: IntoForeign> IntoForeign for Option<T> {
    fn into_foreign(self) -> PyResult<ForeignRef> {
        match self {
            Some(value) => value.into_foreign(),
            None => Ok(ForeignRef::none()),
        }
    }
}

impl<T: FromForeign> FromForeign for Vec<T> {
    /// Lists and tuples only; strings are not sequences of host values here
    fn from_foreign(obj: &ForeignRef) -> PyResult<Self> {
        with_exclusive_access(|| unsafe {
            let ptr = obj.as_ptr();
            if ffi::PyList_Check(ptr) == 0 && ffi::PyTuple_Check(ptr) == 0 {
                return Err(bad_type("list", obj));
            }

            let iter = check_ptr(ffi::PyObject_GetIter(ptr))?;
            let mut items = Vec::new();
            loop {
                match NonNull::new(ffi::PyIter_Next(iter.as_ptr())) {
                    Some(item) => items.push(T::from_foreign(&ForeignRef::adopt(item))?),
                    None => match fetch() {
                        Some(error) => return Err(error),
                        None => break,
                    },
                }
            }
            Ok(items)
        })
    }
}

impl<T: IntoForeign> IntoForeign for Vec<T> {
    fn into_foreign(self) -> PyResult<ForeignRef> {
        with_exclusive_access(|| unsafe {
            let list = check_ptr(ffi::PyList_New(self.len() as ffi::Py_ssize_t))?;
            for (index, item) in self.into_iter().enumerate() {
                // PyList_SetItem steals the item reference
                let item = item.into_foreign()?;
                ffi::PyList_SetItem(list.as_ptr(), index as ffi::Py_ssize_t, item.into_ptr());
            }
            Ok(list)
        })
    }
}
