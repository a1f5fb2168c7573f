//! Logging utilities for the pyglue runtime
//!
//! Lightweight structured events for interpreter lifecycle, reference
//! counting and boundary crossings. Uses `tracing`; every helper compiles to
//! a level check when the subscriber filters it out.

// Re-export tracing macros for use throughout the runtime
pub use tracing::{debug, error, info, trace, warn, Level};

/// Initialize runtime logging with sensible defaults
///
/// Embedding hosts that install their own subscriber should not call this.
/// `PYGLUE_LOG` overrides the default filter.
pub fn init_runtime_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_env("PYGLUE_LOG")
        .unwrap_or_else(|_| {
            #[cfg(debug_assertions)]
            {
                EnvFilter::new("pyglue_runtime=debug")
            }
            #[cfg(not(debug_assertions))]
            {
                EnvFilter::new("pyglue_runtime=info")
            }
        });

    fmt()
        .with_env_filter(filter)
        .compact()
        .try_init()
        .ok(); // Ignore error if already initialized
}

/// Log interpreter initialization
#[inline]
pub fn log_interpreter_init(adopted: bool) {
    info!(
        target: "pyglue_runtime::context",
        adopted,
        "interpreter ready"
    );
}

/// Log an access acquisition on the calling thread
#[inline]
pub fn log_access_acquired(drained: usize) {
    trace!(
        target: "pyglue_runtime::context",
        drained,
        "execution access acquired"
    );
}

/// Log a deferred release queued from a thread without access
#[inline]
pub fn log_deferred_release(ptr: *const u8) {
    trace!(
        target: "pyglue_runtime::refcount",
        ptr = ?ptr,
        "release deferred until next acquisition"
    );
}

/// Log a glue call arriving from the interpreter
#[inline]
pub fn log_glue_call(function_name: &str, args_count: usize) {
    trace!(
        target: "pyglue_runtime::glue",
        function = function_name,
        args_count,
        "glue call"
    );
}

/// Log a glue failure that is about to be raised
#[inline]
pub fn log_glue_error(function_name: &str, error: &dyn std::fmt::Display) {
    debug!(
        target: "pyglue_runtime::glue",
        function = function_name,
        error = %error,
        "raising into interpreter"
    );
}

/// Log a type conversion failure
#[inline]
pub fn log_conversion_failure(expected: &str, found: &str) {
    debug!(
        target: "pyglue_runtime::convert",
        expected,
        found,
        "conversion failed"
    );
}

/// Log a tracked error that lost to an earlier or explicit one
#[inline]
pub fn log_tracked_dropped(reason: &str) {
    debug!(
        target: "pyglue_runtime::error",
        reason,
        "tracked error discarded"
    );
}

/// Log a module definition build
#[inline]
pub fn log_module_built(name: &str, methods: usize, slots: usize) {
    info!(
        target: "pyglue_runtime::module",
        name,
        methods,
        slots,
        "module definition built"
    );
}
