//! Execution context - interpreter initialization and GIL arbitration
//!
//! Design: one interpreter per process, initialized once and never torn
//! down. Access to its execution state is tracked per thread with a depth
//! marker, so nested acquisitions are free and release/restore only acts
//! when the calling thread actually holds access.

use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use pyo3::ffi;

use crate::logging::{debug, log_access_acquired, log_interpreter_init};
use crate::object::refcount;

/// Interpreter lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    Uninitialized,
    Initializing,
    /// `adopted` is true when someone else initialized the interpreter
    Ready { adopted: bool },
}

static READY: AtomicBool = AtomicBool::new(false);
static STATE: Mutex<InitState> = parking_lot::const_mutex(InitState::Uninitialized);

thread_local! {
    /// Nesting depth of access held by this thread; 0 = not held
    static DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Initialize the interpreter if nobody has yet (idempotent)
///
/// An interpreter that is already running (we were loaded as an extension
/// module, or the host initialized it) is adopted as-is. Failure to
/// initialize is fatal.
pub fn ensure_initialized() {
    if READY.load(Ordering::Acquire) {
        return;
    }

    let mut state = STATE.lock();
    if let InitState::Ready { .. } = *state {
        return;
    }
    *state = InitState::Initializing;

    let adopted = unsafe { ffi::Py_IsInitialized() } != 0;
    if !adopted {
        unsafe {
            ffi::Py_InitializeEx(0);
            if ffi::Py_IsInitialized() == 0 {
                panic!("failed to initialize the Python interpreter");
            }
            // Initialization leaves this thread holding the GIL; hand it back
            // so that any thread can acquire through the GILState API.
            ffi::PyEval_SaveThread();
        }
    }

    *state = InitState::Ready { adopted };
    READY.store(true, Ordering::Release);
    log_interpreter_init(adopted);
}

/// Record an interpreter we are running inside of, without blocking
///
/// Used from loader entry points, which may run while another thread is
/// still inside `ensure_initialized`.
pub(crate) fn note_running_interpreter() {
    if READY.load(Ordering::Acquire) {
        return;
    }
    if let Some(mut state) = STATE.try_lock() {
        if *state == InitState::Uninitialized {
            *state = InitState::Ready { adopted: true };
            READY.store(true, Ordering::Release);
            log_interpreter_init(true);
        }
    }
}

/// Current lifecycle state
pub fn state() -> InitState {
    *STATE.lock()
}

/// Whether the calling thread holds execution access
#[inline]
pub fn is_held() -> bool {
    DEPTH.with(Cell::get) > 0
}

/// Run `body` with exclusive access to the interpreter
///
/// Reentrant: if the calling thread already holds access, `body` runs
/// directly without a nested acquisition.
pub fn with_exclusive_access<R>(body: impl FnOnce() -> R) -> R {
    if is_held() {
        let _nested = DepthGuard::enter();
        return body();
    }

    ensure_initialized();
    let _access = AccessGuard::acquire();
    body()
}

/// Run `body` with access temporarily given up
///
/// Lets other threads use the interpreter while this one blocks. When the
/// calling thread holds no access this is a no-op that still runs `body`.
pub fn with_access_released<R>(body: impl FnOnce() -> R) -> R {
    let depth = DEPTH.with(Cell::get);
    if depth == 0 {
        return body();
    }

    let _released = ReleaseGuard::release(depth);
    body()
}

/// Run `body` on a thread the interpreter called into
///
/// # Safety
/// - The calling thread must already hold the GIL (loader entry points and
///   method glue invoked by the interpreter)
pub(crate) unsafe fn with_inherited_access<R>(body: impl FnOnce() -> R) -> R {
    let outermost = !is_held();
    let _inherited = DepthGuard::enter();
    if outermost {
        let drained = refcount::drain_pending();
        log_access_acquired(drained);
    }
    body()
}

/// Nested or inherited access; only moves the depth marker
struct DepthGuard;

impl DepthGuard {
    fn enter() -> Self {
        DEPTH.with(|d| d.set(d.get() + 1));
        DepthGuard
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        DEPTH.with(|d| d.set(d.get() - 1));
    }
}

/// Outermost acquisition on this thread
struct AccessGuard {
    gstate: Option<ffi::PyGILState_STATE>,
}

impl AccessGuard {
    fn acquire() -> Self {
        let gstate = unsafe { ffi::PyGILState_Ensure() };
        DEPTH.with(|d| d.set(1));

        let drained = refcount::drain_pending();
        log_access_acquired(drained);

        Self { gstate: Some(gstate) }
    }
}

impl Drop for AccessGuard {
    fn drop(&mut self) {
        DEPTH.with(|d| d.set(0));
        if let Some(gstate) = self.gstate.take() {
            unsafe { ffi::PyGILState_Release(gstate) };
        }
    }
}

/// Access given up by `with_access_released`, restored on drop
struct ReleaseGuard {
    tstate: *mut ffi::PyThreadState,
    depth: usize,
}

impl ReleaseGuard {
    fn release(depth: usize) -> Self {
        debug!(target: "pyglue_runtime::context", depth, "releasing execution access");
        DEPTH.with(|d| d.set(0));
        let tstate = unsafe { ffi::PyEval_SaveThread() };
        Self { tstate, depth }
    }
}

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        unsafe { ffi::PyEval_RestoreThread(self.tstate) };
        DEPTH.with(|d| d.set(self.depth));
    }
}
