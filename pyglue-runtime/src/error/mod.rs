//! Error bridge - the interpreter's pending-exception slot as host errors
//!
//! The interpreter keeps a single "current exception" per thread state. Any
//! foreign call whose failure is signalled by a null or negative return must
//! be followed by `check_ptr`/`check_status` before the next foreign call.

mod tracking;

pub use tracking::{is_tracking, report_tracked, tracked, tracked_error_pending, with_error_tracking};

use core::ptr::{self, NonNull};
use std::ffi::CString;
use std::fmt;
use std::os::raw::c_int;

use pyo3::ffi;

use crate::context::with_exclusive_access;
use crate::object::{ForeignRef, SharedRef};

pub type PyResult<T> = Result<T, PyError>;

const UNKNOWN_FAILURE: &str = "error return without exception set";

/// Errors crossing the host/foreign boundary
#[derive(Clone, thiserror::Error)]
pub enum PyError {
    /// An exception raised by the interpreter
    #[error("{}", describe_exception(.kind, .value, .traceback))]
    Exception {
        kind: SharedRef,
        value: SharedRef,
        traceback: Option<SharedRef>,
    },

    /// A value's runtime type did not match the expected host type
    #[error("expected {expected}, found {found}")]
    BadType { expected: &'static str, found: String },

    /// A declared host error on its way into the interpreter
    #[error("{message}")]
    Host { message: String },
}

/// Builtin exception classes the bridge raises itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionKind {
    TypeError,
    ValueError,
    OverflowError,
    RuntimeError,
    SystemError,
    KeyError,
    IndexError,
    AttributeError,
}

impl ExceptionKind {
    fn class(self) -> *mut ffi::PyObject {
        unsafe {
            match self {
                Self::TypeError => ffi::PyExc_TypeError,
                Self::ValueError => ffi::PyExc_ValueError,
                Self::OverflowError => ffi::PyExc_OverflowError,
                Self::RuntimeError => ffi::PyExc_RuntimeError,
                Self::SystemError => ffi::PyExc_SystemError,
                Self::KeyError => ffi::PyExc_KeyError,
                Self::IndexError => ffi::PyExc_IndexError,
                Self::AttributeError => ffi::PyExc_AttributeError,
            }
        }
    }
}

impl PyError {
    /// Manufacture a foreign exception of `kind`
    pub fn new(kind: ExceptionKind, message: impl Into<String>) -> Self {
        let message = message.into();
        with_exclusive_access(|| {
            set_string(kind.class(), &message);
            fetch().unwrap_or(PyError::Host { message })
        })
    }

    /// Failure reported by the interpreter with nothing pending
    pub fn unknown() -> Self {
        Self::new(ExceptionKind::SystemError, UNKNOWN_FAILURE)
    }

    /// Wrap a declared host error
    pub fn from_host<E: fmt::Display>(error: E) -> Self {
        PyError::Host { message: error.to_string() }
    }

    /// Whether this error is an instance of `kind`
    pub fn is(&self, kind: ExceptionKind) -> bool {
        match self {
            PyError::Exception { value, .. } => with_exclusive_access(|| unsafe {
                ffi::PyErr_GivenExceptionMatches(value.as_ptr(), kind.class()) != 0
            }),
            PyError::BadType { .. } => kind == ExceptionKind::TypeError,
            PyError::Host { .. } => kind == ExceptionKind::RuntimeError,
        }
    }

    /// The exception object, when this is a foreign exception
    pub fn value(&self) -> Option<&ForeignRef> {
        match self {
            PyError::Exception { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn traceback(&self) -> Option<&ForeignRef> {
        match self {
            PyError::Exception { traceback, .. } => traceback.as_deref(),
            _ => None,
        }
    }

    /// Raise this error into the interpreter's pending-exception slot
    pub fn restore(self) {
        with_exclusive_access(|| match self {
            PyError::Exception { kind, value, traceback } => unsafe {
                ffi::PyErr_Restore(
                    kind.to_foreign().into_ptr(),
                    value.to_foreign().into_ptr(),
                    traceback.map_or(ptr::null_mut(), |tb| tb.to_foreign().into_ptr()),
                );
            },
            PyError::BadType { .. } => {
                set_string(ExceptionKind::TypeError.class(), &self.to_string());
            }
            PyError::Host { message } => {
                set_string(ExceptionKind::RuntimeError.class(), &message);
            }
        })
    }
}

impl fmt::Debug for PyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PyError::Exception { kind, value, traceback } => f
                .debug_struct("Exception")
                .field("type", &class_name(kind))
                .field("value", &value.repr_lossy())
                .field("traceback", &traceback.as_ref().map(|tb| format_traceback(tb)))
                .finish(),
            PyError::BadType { expected, found } => f
                .debug_struct("BadType")
                .field("expected", expected)
                .field("found", found)
                .finish(),
            PyError::Host { message } => f.debug_struct("Host").field("message", message).finish(),
        }
    }
}

/// Fetch and clear the pending exception, if any
pub(crate) fn fetch() -> Option<PyError> {
    with_exclusive_access(|| unsafe {
        if ffi::PyErr_Occurred().is_null() {
            return None;
        }

        let mut kind = ptr::null_mut();
        let mut value = ptr::null_mut();
        let mut traceback = ptr::null_mut();
        ffi::PyErr_Fetch(&mut kind, &mut value, &mut traceback);
        ffi::PyErr_NormalizeException(&mut kind, &mut value, &mut traceback);

        let kind = ForeignRef::adopt(NonNull::new(kind)?);
        let value = match NonNull::new(value) {
            Some(value) => ForeignRef::adopt(value),
            None => ForeignRef::none(),
        };
        let traceback = NonNull::new(traceback).map(|tb| ForeignRef::adopt(tb));
        if let Some(tb) = &traceback {
            ffi::PyException_SetTraceback(value.as_ptr(), tb.as_ptr());
        }

        Some(PyError::Exception {
            kind: kind.into(),
            value: value.into(),
            traceback: traceback.map(SharedRef::new),
        })
    })
}

/// Succeed if nothing is pending, otherwise take the pending exception
pub fn check() -> PyResult<()> {
    match fetch() {
        None => Ok(()),
        Some(error) => Err(error),
    }
}

/// Adopt a new reference returned by a foreign call, or take its error
///
/// # Safety
/// - A non-null `ptr` must be a new reference owned by the caller
pub unsafe fn check_ptr(ptr: *mut ffi::PyObject) -> PyResult<ForeignRef> {
    match NonNull::new(ptr) {
        Some(ptr) => Ok(ForeignRef::adopt(ptr)),
        None => Err(fetch().unwrap_or_else(PyError::unknown)),
    }
}

/// Like `check_ptr` for borrowed returns: retain instead of adopting
///
/// # Safety
/// - A non-null `ptr` must point to a live foreign object
pub unsafe fn check_borrowed(ptr: *mut ffi::PyObject) -> PyResult<ForeignRef> {
    match NonNull::new(ptr) {
        Some(ptr) => Ok(ForeignRef::retain(ptr)),
        None => Err(fetch().unwrap_or_else(PyError::unknown)),
    }
}

/// Take the pending error for a negative status code
pub fn check_status(code: c_int) -> PyResult<c_int> {
    if code < 0 {
        Err(fetch().unwrap_or_else(PyError::unknown))
    } else {
        Ok(code)
    }
}

fn set_string(class: *mut ffi::PyObject, message: &str) {
    let message = CString::new(message.replace('\0', "")).unwrap_or_default();
    unsafe { ffi::PyErr_SetString(class, message.as_ptr()) };
}

fn class_name(kind: &ForeignRef) -> String {
    with_exclusive_access(|| unsafe {
        let tp = kind.as_ptr().cast::<ffi::PyTypeObject>();
        std::ffi::CStr::from_ptr((*tp).tp_name).to_string_lossy().into_owned()
    })
}

fn format_traceback(traceback: &ForeignRef) -> String {
    crate::interpreter::format_traceback(traceback).unwrap_or_else(|_| "<traceback unavailable>".to_string())
}

fn describe_exception(kind: &SharedRef, value: &SharedRef, traceback: &Option<SharedRef>) -> String {
    let mut text = class_name(kind);
    let message = value.str_lossy();
    if !message.is_empty() {
        text.push_str(": ");
        text.push_str(&message);
    }
    if let Some(tb) = traceback {
        text.push_str("\nTraceback (most recent call last):\n");
        text.push_str(format_traceback(tb).trim_end());
    }
    text
}

#[cfg(test)]
mod tests;
