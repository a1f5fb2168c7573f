//! pyglue - exposes Rust functions to CPython as extension modules
//!
//! The generator reads function signatures from symbol manifests, picks a
//! calling convention for each function and writes two Rust source files
//! per extension module: the glue functions and the module descriptor with
//! its `PyInit_<target>` entry point. The generated code links against
//! `pyglue-runtime`.

pub mod config;
pub mod convention;
pub mod errors;
pub mod generator;
pub mod logging;
pub mod signature;
pub mod source;

// Re-export commonly used items
pub use config::{GenConfig, GilUsage, MultipleInterpretersMode};
pub use convention::CallingConvention;
pub use errors::{GenError, Result};
pub use generator::{generate, plan, ArtifactPaths, GenerateRequest, GenerationReport, Plan};
pub use logging::{init_dev_logging, init_file_logging, init_logging, LogConfig, LogFormat, LogOutput};
pub use signature::{Argument, FunctionSignature, TypeTag};
pub use source::SymbolManifest;
