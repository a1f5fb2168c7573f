//! Item, sequence and mapping access

use pyo3::ffi;

use crate::context::with_exclusive_access;
use crate::convert::IntoForeign;
use crate::error::{check_ptr, check_status, fetch, tracked, PyError, PyResult};
use crate::object::ForeignRef;

impl ForeignRef {
    /// `obj[key]`
    pub fn get_item(&self, key: impl IntoForeign) -> PyResult<ForeignRef> {
        let key = key.into_foreign()?;
        with_exclusive_access(|| unsafe { check_ptr(ffi::PyObject_GetItem(self.as_ptr(), key.as_ptr())) })
    }

    /// `obj[key] = value`
    pub fn set_item(&self, key: impl IntoForeign, value: impl IntoForeign) -> PyResult<()> {
        let key = key.into_foreign()?;
        let value = value.into_foreign()?;
        with_exclusive_access(|| {
            check_status(unsafe { ffi::PyObject_SetItem(self.as_ptr(), key.as_ptr(), value.as_ptr()) }).map(drop)
        })
    }

    /// `del obj[key]`
    pub fn del_item(&self, key: impl IntoForeign) -> PyResult<()> {
        let key = key.into_foreign()?;
        with_exclusive_access(|| {
            check_status(unsafe { ffi::PyObject_DelItem(self.as_ptr(), key.as_ptr()) }).map(drop)
        })
    }

    /// `len(obj)`
    pub fn len(&self) -> PyResult<usize> {
        with_exclusive_access(|| {
            let size = unsafe { ffi::PyObject_Size(self.as_ptr()) };
            if size < 0 {
                return Err(fetch().unwrap_or_else(PyError::unknown));
            }
            Ok(size as usize)
        })
    }

    pub fn is_empty(&self) -> PyResult<bool> {
        self.len().map(|len| len == 0)
    }

    /// `value in obj`
    pub fn contains(&self, value: impl IntoForeign) -> PyResult<bool> {
        let value = value.into_foreign()?;
        with_exclusive_access(|| {
            check_status(unsafe { ffi::PySequence_Contains(self.as_ptr(), value.as_ptr()) }).map(|r| r == 1)
        })
    }

    /// `list(obj.keys())`
    pub fn keys(&self) -> PyResult<ForeignRef> {
        with_exclusive_access(|| unsafe { check_ptr(ffi::PyMapping_Keys(self.as_ptr())) })
    }

    /// `list(obj.values())`
    pub fn values(&self) -> PyResult<ForeignRef> {
        with_exclusive_access(|| unsafe { check_ptr(ffi::PyMapping_Values(self.as_ptr())) })
    }

    /// `list(obj.items())`
    pub fn items(&self) -> PyResult<ForeignRef> {
        with_exclusive_access(|| unsafe { check_ptr(ffi::PyMapping_Items(self.as_ptr())) })
    }

    /// `obj[key]` with failures reported to the tracking scope
    ///
    /// # Panics
    /// On failure when no tracking scope is open.
    pub fn item(&self, key: impl IntoForeign) -> Option<ForeignRef> {
        tracked(self.get_item(key).map(Some), || None)
    }
}
