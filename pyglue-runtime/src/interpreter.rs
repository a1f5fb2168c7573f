//! Interpreter helpers - imports and source evaluation

use std::ffi::CString;
use std::os::raw::c_int;

use pyo3::ffi;

use crate::context::with_exclusive_access;
use crate::convert::{extract, IntoForeign};
use crate::error::{check_ptr, check_status, ExceptionKind, PyError, PyResult};
use crate::logging::trace;
use crate::object::ForeignRef;

fn c_string(text: &str, what: &str) -> PyResult<CString> {
    CString::new(text).map_err(|_| PyError::new(ExceptionKind::ValueError, format!("{what} contains a NUL byte")))
}

/// `import name`
pub fn import(name: &str) -> PyResult<ForeignRef> {
    let name = c_string(name, "module name")?;
    with_exclusive_access(|| unsafe { check_ptr(ffi::PyImport_ImportModule(name.as_ptr())) })
}

/// The `builtins` module
pub fn builtins() -> PyResult<ForeignRef> {
    import("builtins")
}

/// Evaluate a single expression in a fresh namespace
pub fn eval(expression: &str) -> PyResult<ForeignRef> {
    let code = c_string(expression, "expression")?;
    with_exclusive_access(|| {
        let globals = fresh_globals()?;
        trace!(target: "pyglue_runtime::interpreter", expression, "eval");
        run_code(&code, ffi::Py_eval_input, &globals)
    })
}

/// Execute statements in a fresh namespace and return that namespace
pub fn run(source: &str) -> PyResult<ForeignRef> {
    let code = c_string(source, "source")?;
    with_exclusive_access(|| {
        let globals = fresh_globals()?;
        run_code(&code, ffi::Py_file_input, &globals)?;
        Ok(globals)
    })
}

/// Render a traceback object the way the interpreter prints it
pub fn format_traceback(traceback: &ForeignRef) -> PyResult<String> {
    with_exclusive_access(|| {
        let lines = import("traceback")?.call_method("format_tb", &[traceback.copy()])?;
        let joined = "".into_foreign()?.call_method("join", &[lines])?;
        extract::<String>(&joined)
    })
}

fn fresh_globals() -> PyResult<ForeignRef> {
    let globals = unsafe { check_ptr(ffi::PyDict_New())? };
    let builtins = builtins()?;
    check_status(unsafe {
        ffi::PyDict_SetItemString(globals.as_ptr(), cstr!("__builtins__"), builtins.as_ptr())
    })?;
    Ok(globals)
}

fn run_code(code: &CString, start: c_int, globals: &ForeignRef) -> PyResult<ForeignRef> {
    unsafe {
        check_ptr(ffi::PyRun_StringFlags(
            code.as_ptr(),
            start,
            globals.as_ptr(),
            globals.as_ptr(),
            core::ptr::null_mut(),
        ))
    }
}
