//! Rich comparison
//!
//! The fallible forms return `PyResult`. The operator impls have no error
//! channel: a failing comparison is reported to the tracking scope and
//! compares as `false` (or unordered).

use core::cmp::Ordering;
use std::os::raw::c_int;

use pyo3::ffi;

use crate::context::with_exclusive_access;
use crate::error::{check_ptr, check_status, tracked, PyResult};
use crate::object::ForeignRef;

/// One opcode per comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Lt,
    Le,
    Eq,
    Ne,
    Gt,
    Ge,
}

impl CompareOp {
    #[inline]
    fn opcode(self) -> c_int {
        match self {
            Self::Lt => ffi::Py_LT,
            Self::Le => ffi::Py_LE,
            Self::Eq => ffi::Py_EQ,
            Self::Ne => ffi::Py_NE,
            Self::Gt => ffi::Py_GT,
            Self::Ge => ffi::Py_GE,
        }
    }
}

impl ForeignRef {
    /// `self <op> other` as a truth value
    pub fn compare(&self, other: &ForeignRef, op: CompareOp) -> PyResult<bool> {
        with_exclusive_access(|| {
            check_status(unsafe { ffi::PyObject_RichCompareBool(self.as_ptr(), other.as_ptr(), op.opcode()) })
                .map(|r| r == 1)
        })
    }

    /// `self <op> other` as whatever object the comparison returns
    pub fn rich_compare(&self, other: &ForeignRef, op: CompareOp) -> PyResult<ForeignRef> {
        with_exclusive_access(|| unsafe {
            check_ptr(ffi::PyObject_RichCompare(self.as_ptr(), other.as_ptr(), op.opcode()))
        })
    }

    fn compare_tracked(&self, other: &ForeignRef, op: CompareOp) -> bool {
        tracked(self.compare(other, op), || false)
    }
}

impl PartialEq for ForeignRef {
    fn eq(&self, other: &Self) -> bool {
        self.compare_tracked(other, CompareOp::Eq)
    }

    #[allow(clippy::partialeq_ne_impl)]
    fn ne(&self, other: &Self) -> bool {
        self.compare_tracked(other, CompareOp::Ne)
    }
}

impl PartialOrd for ForeignRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.compare_tracked(other, CompareOp::Lt) {
            Some(Ordering::Less)
        } else if self.compare_tracked(other, CompareOp::Eq) {
            Some(Ordering::Equal)
        } else if self.compare_tracked(other, CompareOp::Gt) {
            Some(Ordering::Greater)
        } else {
            None
        }
    }

    fn lt(&self, other: &Self) -> bool {
        self.compare_tracked(other, CompareOp::Lt)
    }

    fn le(&self, other: &Self) -> bool {
        self.compare_tracked(other, CompareOp::Le)
    }

    fn gt(&self, other: &Self) -> bool {
        self.compare_tracked(other, CompareOp::Gt)
    }

    fn ge(&self, other: &Self) -> bool {
        self.compare_tracked(other, CompareOp::Ge)
    }
}
