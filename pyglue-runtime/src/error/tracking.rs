//! Tracked errors - failures from call sites that cannot return `Result`
//!
//! Operator impls (`==`, `<`), iterator `next` and the ergonomic `attr` /
//! `item` accessors have no error channel. They report into the innermost
//! scope opened by `with_error_tracking`, which surfaces the error when the
//! scope closes. Each scope holds at most one pending error; the first
//! report wins.
//!
//! Scopes live on the calling thread's stack of dynamic extents; reporting
//! or observing with no open scope is a programming error and panics.

use std::cell::RefCell;

use super::{PyError, PyResult};
use crate::logging::log_tracked_dropped;

thread_local! {
    static SCOPES: RefCell<Vec<Option<PyError>>> = const { RefCell::new(Vec::new()) };
}

/// Run `body` inside a tracking scope
///
/// Precedence when both happen: an `Err` returned by `body` wins and the
/// tracked report is discarded. A tracked report surfaces as the error when
/// `body` returned `Ok`. The scope's slot is empty afterwards either way.
pub fn with_error_tracking<T>(body: impl FnOnce() -> PyResult<T>) -> PyResult<T> {
    let scope = TrackingScope::open();
    let outcome = body();
    let tracked = scope.close();

    match (outcome, tracked) {
        (Err(explicit), Some(_)) => {
            log_tracked_dropped("explicit error takes precedence");
            Err(explicit)
        }
        (Err(explicit), None) => Err(explicit),
        (Ok(_), Some(reported)) => Err(reported),
        (Ok(value), None) => Ok(value),
    }
}

/// Record `error` in the innermost tracking scope
///
/// # Panics
/// When no tracking scope is open on this thread.
pub fn report_tracked(error: PyError) {
    let accepted = SCOPES.with(|scopes| match scopes.borrow_mut().last_mut() {
        None => Err(error),
        Some(slot @ None) => {
            *slot = Some(error);
            Ok(())
        }
        Some(Some(_)) => {
            log_tracked_dropped("earlier tracked error pending");
            Ok(())
        }
    });

    if let Err(error) = accepted {
        panic!("tracked-fallible operation used outside with_error_tracking: {error}");
    }
}

/// Whether the innermost scope already holds an error
///
/// # Panics
/// When no tracking scope is open on this thread.
pub fn tracked_error_pending() -> bool {
    let pending = SCOPES.with(|scopes| scopes.borrow().last().map(Option::is_some));
    match pending {
        Some(pending) => pending,
        None => panic!("tracked error state observed outside with_error_tracking"),
    }
}

/// Whether a tracking scope is open on this thread
pub fn is_tracking() -> bool {
    SCOPES.with(|scopes| !scopes.borrow().is_empty())
}

/// Unwrap `result`, reporting its error and substituting `fallback`
pub fn tracked<T>(result: PyResult<T>, fallback: impl FnOnce() -> T) -> T {
    match result {
        Ok(value) => value,
        Err(error) => {
            report_tracked(error);
            fallback()
        }
    }
}

/// One open scope; popped on close or while unwinding
struct TrackingScope {
    depth: usize,
    closed: bool,
}

impl TrackingScope {
    fn open() -> Self {
        let depth = SCOPES.with(|scopes| {
            let mut scopes = scopes.borrow_mut();
            scopes.push(None);
            scopes.len()
        });
        Self { depth, closed: false }
    }

    fn close(mut self) -> Option<PyError> {
        self.closed = true;
        SCOPES.with(|scopes| {
            let mut scopes = scopes.borrow_mut();
            debug_assert_eq!(scopes.len(), self.depth, "tracking scopes closed out of order");
            scopes.pop().flatten()
        })
    }
}

impl Drop for TrackingScope {
    fn drop(&mut self) {
        if !self.closed {
            // Unwinding: drop this scope and anything opened inside it.
            let discarded: Vec<_> =
                SCOPES.with(|scopes| scopes.borrow_mut().drain(self.depth - 1..).collect());
            drop(discarded);
        }
    }
}
