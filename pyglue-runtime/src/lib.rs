//! pyglue runtime - bridge between Rust hosts and an embedded CPython
//!
//! This crate is linked into embedding hosts and into extension modules
//! produced by the `pyglue` generator.
//!
//! Architecture:
//! - `object`      - `ForeignRef` ownership wrapper and reference counting
//! - `context`     - interpreter initialization and GIL arbitration
//! - `error`       - exception fetch/restore and tracked error scopes
//! - `protocol`    - attribute, item, call, comparison and iteration façade
//! - `convert`     - host ↔ foreign value conversions
//! - `interpreter` - import / eval / run helpers
//! - `glue`        - marshalling helpers called by generated glue
//! - `module`      - module definition builder behind `PyInit_*`

/// NUL-terminated C string literal as `*const c_char`.
macro_rules! cstr {
    ($s:expr) => {
        concat!($s, "\0").as_ptr().cast::<::std::os::raw::c_char>()
    };
}

pub mod logging;
pub mod object;
pub mod context;
pub mod error;
pub mod protocol;
pub mod convert;
pub mod interpreter;
pub mod glue;
pub mod module;

pub use pyo3::ffi;

// Re-export core types
pub use object::{ForeignRef, SharedRef};
pub use context::{ensure_initialized, with_access_released, with_exclusive_access};
pub use error::{
    check, report_tracked, with_error_tracking, ExceptionKind, PyError, PyResult,
};
pub use protocol::{CompareOp, ForeignIter};
pub use convert::{extract, FromForeign, IntoForeign};
pub use module::{
    GilMode, MethodEntry, MethodImpl, ModuleDescriptor, ModuleOptions, MultipleInterpreters,
};

/// Runtime initialization for C callers
///
/// Rust hosts never need this: every public entry point initializes the
/// interpreter on first use.
#[no_mangle]
pub extern "C" fn pyglue_runtime_init() {
    context::ensure_initialized();
}
