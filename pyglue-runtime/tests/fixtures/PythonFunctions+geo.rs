// @generated by pyglue from the `geo` symbol manifests. Do not edit.
//
// Include from the crate root of the extension module:
//     include!(concat!(env!("OUT_DIR"), "/PythonFunctions+geo.rs"));

/// Glue for `origin` (no-arguments)
#[doc(hidden)]
#[allow(clippy::missing_safety_doc)]
pub unsafe extern "C" fn __pyglue_origin(_module: *mut ::pyglue_runtime::ffi::PyObject, _unused: *mut ::pyglue_runtime::ffi::PyObject) -> *mut ::pyglue_runtime::ffi::PyObject {
    ::pyglue_runtime::glue::no_arguments("origin", || {
        let result: ::std::vec::Vec<f64> = origin();
        Ok(result)
    })
}

/// Glue for `norm` (single-positional)
#[doc(hidden)]
#[allow(clippy::missing_safety_doc)]
pub unsafe extern "C" fn __pyglue_norm(_module: *mut ::pyglue_runtime::ffi::PyObject, arg: *mut ::pyglue_runtime::ffi::PyObject) -> *mut ::pyglue_runtime::ffi::PyObject {
    ::pyglue_runtime::glue::single_positional("norm", arg, |arg| {
        let arg0 = ::pyglue_runtime::convert::extract::<::std::vec::Vec<f64>>(arg)?;
        let result: f64 = norm(arg0);
        Ok(result)
    })
}

/// Glue for `scale` (fast-positional)
#[doc(hidden)]
#[allow(clippy::missing_safety_doc)]
pub unsafe extern "C" fn __pyglue_scale(_module: *mut ::pyglue_runtime::ffi::PyObject, args: *const *mut ::pyglue_runtime::ffi::PyObject, nargs: ::pyglue_runtime::ffi::Py_ssize_t) -> *mut ::pyglue_runtime::ffi::PyObject {
    ::pyglue_runtime::glue::fast_positional("scale", args, nargs, 2, |args| {
        let arg0 = ::pyglue_runtime::convert::extract::<f64>(&args[0])?;
        let arg1 = ::pyglue_runtime::convert::extract::<f64>(&args[1])?;
        let result: f64 = scale(arg0, arg1).map_err(::pyglue_runtime::PyError::from_host)?;
        Ok(result)
    })
}

/// Glue for `keep` (single-positional)
#[doc(hidden)]
#[allow(clippy::missing_safety_doc)]
pub unsafe extern "C" fn __pyglue_keep(_module: *mut ::pyglue_runtime::ffi::PyObject, arg: *mut ::pyglue_runtime::ffi::PyObject) -> *mut ::pyglue_runtime::ffi::PyObject {
    ::pyglue_runtime::glue::single_positional("keep", arg, |arg| {
        let arg0 = ::pyglue_runtime::convert::extract::<::pyglue_runtime::ForeignRef>(arg)?;
        keep(arg0);
        Ok(())
    })
}
