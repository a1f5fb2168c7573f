// @generated by pyglue from the `geo` symbol manifests. Do not edit.
//
// Include next to PythonFunctions+geo.rs:
//     include!(concat!(env!("OUT_DIR"), "/PythonModule+geo.rs"));

static __PYGLUE_METHODS: [::pyglue_runtime::MethodEntry; 4] = [
    ::pyglue_runtime::MethodEntry::new("origin", ::pyglue_runtime::MethodImpl::NoArguments(__pyglue_origin), None),
    ::pyglue_runtime::MethodEntry::new("norm", ::pyglue_runtime::MethodImpl::SinglePositional(__pyglue_norm), Some("Euclidean norm.")),
    ::pyglue_runtime::MethodEntry::new("scale", ::pyglue_runtime::MethodImpl::FastPositional(__pyglue_scale), None),
    ::pyglue_runtime::MethodEntry::new("keep", ::pyglue_runtime::MethodImpl::SinglePositional(__pyglue_keep), None),
];

static __PYGLUE_MODULE: ::pyglue_runtime::ModuleDescriptor = ::pyglue_runtime::ModuleDescriptor::new(
    "geo",
    None,
    &__PYGLUE_METHODS,
    ::pyglue_runtime::ModuleOptions {
        multiple_interpreters: ::pyglue_runtime::MultipleInterpreters::NotSupported,
        gil: ::pyglue_runtime::GilMode::Used,
    },
);

/// Loader entry point for `geo`
#[no_mangle]
#[allow(non_snake_case, clippy::missing_safety_doc)]
pub unsafe extern "C" fn PyInit_geo() -> *mut ::pyglue_runtime::ffi::PyObject {
    __PYGLUE_MODULE.initialize()
}
