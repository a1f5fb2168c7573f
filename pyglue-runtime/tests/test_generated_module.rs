//! Generator output compiled against the runtime and called from Python
//!
//! The fixtures are `pyglue gen` output for the `geo` manifest used by the
//! generator's own tests; that side checks the text still matches.

use std::fmt;

use parking_lot::Mutex;
use pyglue_runtime::ffi;
use pyglue_runtime::interpreter::{eval, import};
use pyglue_runtime::{extract, with_exclusive_access, ExceptionKind, ForeignRef, IntoForeign};

static KEPT: Mutex<Vec<ForeignRef>> = parking_lot::const_mutex(Vec::new());

#[derive(Debug)]
struct GeoError(f64);

impl fmt::Display for GeoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot scale by {}", self.0)
    }
}

fn origin() -> Vec<f64> {
    vec![0.0, 0.0]
}

fn norm(of: Vec<f64>) -> f64 {
    of.iter().map(|x| x * x).sum::<f64>().sqrt()
}

fn scale(value: f64, factor: f64) -> Result<f64, GeoError> {
    if factor.is_finite() {
        Ok(value * factor)
    } else {
        Err(GeoError(factor))
    }
}

fn keep(obj: ForeignRef) {
    KEPT.lock().push(obj);
}

include!("fixtures/PythonFunctions+geo.rs");
include!("fixtures/PythonModule+geo.rs");

/// Create and execute the module the way the import machinery does
fn load() -> ForeignRef {
    with_exclusive_access(|| unsafe {
        let definition = PyInit_geo();
        assert!(!definition.is_null());
        assert_eq!(definition.cast::<ffi::PyModuleDef>(), __PYGLUE_MODULE.definition());

        let spec = eval("__import__('types').SimpleNamespace(name='geo')").unwrap();
        let module =
            pyglue_runtime::error::check_ptr(ffi::PyModule_FromDefAndSpec(__PYGLUE_MODULE.definition(), spec.as_ptr()))
                .unwrap();
        assert_eq!(ffi::PyModule_ExecDef(module.as_ptr(), __PYGLUE_MODULE.definition()), 0);
        module
    })
}

#[test]
fn test_every_convention_round_trips() {
    let geo = load();
    with_exclusive_access(|| {
        let zero = geo.call_method("origin", &[]).unwrap();
        assert_eq!(extract::<Vec<f64>>(&zero).unwrap(), vec![0.0, 0.0]);

        let length = geo.call_method("norm", &[vec![3.0, 4.0].into_foreign().unwrap()]).unwrap();
        assert_eq!(extract::<f64>(&length).unwrap(), 5.0);

        let args = [2.5_f64.into_foreign().unwrap(), 4_i64.into_foreign().unwrap()];
        let scaled = geo.call_method("scale", &args).unwrap();
        assert_eq!(extract::<f64>(&scaled).unwrap(), 10.0);
    });
}

#[test]
fn test_declared_error_raises() {
    let geo = load();
    with_exclusive_access(|| {
        let args = [1.0_f64.into_foreign().unwrap(), eval("float('inf')").unwrap()];
        let err = geo.call_method("scale", &args).unwrap_err();
        assert!(err.is(ExceptionKind::RuntimeError));
        assert!(err.to_string().contains("cannot scale by inf"));

        let err = geo.call_method("norm", &["north".into_foreign().unwrap()]).unwrap_err();
        assert!(err.is(ExceptionKind::TypeError));
    });
}

#[test]
fn test_doc_strings_reach_the_interpreter() {
    let geo = load();
    with_exclusive_access(|| {
        let doc = geo.getattr("norm").unwrap().getattr("__doc__").unwrap();
        assert_eq!(extract::<String>(&doc).unwrap(), "Euclidean norm.");
    });
}

#[test]
fn test_passthrough_outlives_the_call() {
    let geo = load();
    with_exclusive_access(|| {
        let obj = eval("type('Marker', (), {})()").unwrap();
        let weak = import("weakref").unwrap().getattr("ref").unwrap().call(&[obj.copy()]).unwrap();

        let returned = geo.call_method("keep", &[obj.copy()]).unwrap();
        assert!(returned.is_none());
        drop(obj);
        assert!(!weak.call0().unwrap().is_none());

        let kept = KEPT.lock().pop().unwrap();
        assert!(kept.is_managed());
        drop(kept);
        assert!(weak.call0().unwrap().is_none());
    });
}
