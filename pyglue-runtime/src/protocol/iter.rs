//! Lazily pulled iteration over foreign iterables

use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::ptr::NonNull;

use pyo3::ffi;

use crate::context::with_exclusive_access;
use crate::convert::FromForeign;
use crate::error::{check_ptr, fetch, report_tracked, PyResult};
use crate::object::ForeignRef;

/// Cursor over a foreign iterator yielding converted host values
///
/// Finite and non-restartable. `next` has no error channel, so failures go
/// to the tracking scope: an element that fails to convert is reported and
/// skipped, a failing pull is reported and ends the iteration.
pub struct ForeignIter<T> {
    iter: Option<ForeignRef>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: FromForeign> ForeignIter<T> {
    /// `iter(iterable)`; an iterator yields itself
    pub fn new(iterable: &ForeignRef) -> PyResult<Self> {
        let iter = with_exclusive_access(|| unsafe { check_ptr(ffi::PyObject_GetIter(iterable.as_ptr())) })?;
        Ok(Self { iter: Some(iter), _marker: PhantomData })
    }

    fn pull(iter: &ForeignRef) -> Option<PyResult<ForeignRef>> {
        with_exclusive_access(|| unsafe {
            match NonNull::new(ffi::PyIter_Next(iter.as_ptr())) {
                Some(item) => Some(Ok(ForeignRef::adopt(item))),
                None => fetch().map(Err),
            }
        })
    }
}

impl<T: FromForeign> Iterator for ForeignIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        loop {
            let pulled = Self::pull(self.iter.as_ref()?);
            match pulled {
                Some(Ok(item)) => match T::from_foreign(&item) {
                    Ok(value) => return Some(value),
                    Err(error) => report_tracked(error),
                },
                Some(Err(error)) => {
                    self.iter = None;
                    report_tracked(error);
                    return None;
                }
                None => {
                    self.iter = None;
                    return None;
                }
            }
        }
    }
}

impl<T: FromForeign> FusedIterator for ForeignIter<T> {}

impl ForeignRef {
    /// Iterate, converting each element to `T`
    pub fn iter<T: FromForeign>(&self) -> PyResult<ForeignIter<T>> {
        ForeignIter::new(self)
    }
}
