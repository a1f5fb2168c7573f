//! Marshalling helpers called by generated glue functions
//!
//! Every glue function the generator emits is a thin `extern "C"` shim that
//! forwards its raw arguments to one of the helpers below together with a
//! closure doing the typed conversions and the host call. The helpers:
//!
//! 1. mark execution access as inherited from the calling interpreter
//! 2. borrow each argument as an unmanaged `ForeignRef`
//! 3. run the closure, catching panics
//! 4. hand back a new reference, or restore the error and return null
//!
//! No host error or panic ever crosses back into the interpreter.

use core::ptr::{self, NonNull};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use pyo3::ffi;
use smallvec::SmallVec;

use crate::context::with_inherited_access;
use crate::convert::IntoForeign;
use crate::error::{ExceptionKind, PyError, PyResult};
use crate::logging::{log_glue_call, log_glue_error};
use crate::object::ForeignRef;

/// Arguments of a fast-positional call, borrowed from the caller's frame
type BorrowedArgs = SmallVec<[ForeignRef; 8]>;

/// Glue for a function taking no arguments
///
/// # Safety
/// - Must be called by the interpreter (GIL held)
pub unsafe fn no_arguments<R, F>(name: &'static str, body: F) -> *mut ffi::PyObject
where
    R: IntoForeign,
    F: FnOnce() -> PyResult<R>,
{
    enter(name, 0, body)
}

/// Glue for a function taking exactly one positional argument
///
/// # Safety
/// - Must be called by the interpreter (GIL held)
/// - `arg` must be a borrowed reference valid for the duration of the call
pub unsafe fn single_positional<R, F>(name: &'static str, arg: *mut ffi::PyObject, body: F) -> *mut ffi::PyObject
where
    R: IntoForeign,
    F: FnOnce(&ForeignRef) -> PyResult<R>,
{
    enter(name, 1, || {
        let arg = borrow_arg(arg)?;
        body(&arg)
    })
}

/// Glue for a function taking `arity` positional arguments
///
/// # Safety
/// - Must be called by the interpreter (GIL held)
/// - `args` must point to `nargs` borrowed references valid for the duration
///   of the call
pub unsafe fn fast_positional<R, F>(
    name: &'static str,
    args: *const *mut ffi::PyObject,
    nargs: ffi::Py_ssize_t,
    arity: usize,
    body: F,
) -> *mut ffi::PyObject
where
    R: IntoForeign,
    F: FnOnce(&[ForeignRef]) -> PyResult<R>,
{
    let count = usize::try_from(nargs).unwrap_or(0);
    enter(name, count, || {
        if count != arity {
            return Err(PyError::new(
                ExceptionKind::TypeError,
                format!("{name}() takes {arity} positional arguments but {count} were given"),
            ));
        }

        let args = if count == 0 {
            BorrowedArgs::new()
        } else {
            std::slice::from_raw_parts(args, count)
                .iter()
                .map(|&arg| borrow_arg(arg))
                .collect::<PyResult<BorrowedArgs>>()?
        };
        body(&args)
    })
}

/// Arguments are owned by the caller's frame; never retain them
unsafe fn borrow_arg(arg: *mut ffi::PyObject) -> PyResult<ForeignRef> {
    match NonNull::new(arg) {
        Some(arg) => Ok(ForeignRef::borrowed(arg)),
        None => Err(PyError::new(ExceptionKind::SystemError, "null argument passed to glue")),
    }
}

unsafe fn enter<R, F>(name: &'static str, nargs: usize, body: F) -> *mut ffi::PyObject
where
    R: IntoForeign,
    F: FnOnce() -> PyResult<R>,
{
    with_inherited_access(|| {
        log_glue_call(name, nargs);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| body().and_then(IntoForeign::into_foreign)));
        let result = match outcome {
            Ok(result) => result,
            Err(payload) => Err(PyError::new(
                ExceptionKind::RuntimeError,
                format!("{name}() panicked: {}", panic_message(payload.as_ref())),
            )),
        };

        match result {
            Ok(value) => value.into_ptr(),
            Err(error) => {
                log_glue_error(name, &error);
                error.restore();
                ptr::null_mut()
            }
        }
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}
