//! Tests for the error bridge and tracked error scopes

use super::*;
use crate::convert::IntoForeign;
use crate::interpreter::run;

#[cfg(test)]
mod check_tests {
    use super::*;

    #[test]
    fn test_check_with_nothing_pending() {
        assert!(check().is_ok());
    }

    #[test]
    fn test_check_takes_pending_exception() {
        with_exclusive_access(|| {
            set_string(ExceptionKind::ValueError.class(), "bad input");
            let err = check().unwrap_err();
            assert!(err.is(ExceptionKind::ValueError));
            assert_eq!(err.to_string(), "ValueError: bad input");

            // Taken, not copied
            assert!(check().is_ok());
        });
    }

    #[test]
    fn test_null_without_exception_is_unknown_failure() {
        let err = unsafe { check_ptr(ptr::null_mut()) }.unwrap_err();
        assert!(err.is(ExceptionKind::SystemError));
        assert_eq!(err.to_string(), format!("SystemError: {UNKNOWN_FAILURE}"));

        let err = check_status(-1).unwrap_err();
        assert!(err.is(ExceptionKind::SystemError));
        assert_eq!(check_status(1).unwrap(), 1);
    }

    #[test]
    fn test_restore_round_trips_through_interpreter() {
        let original = PyError::new(ExceptionKind::ValueError, "kept");
        let value = original.value().unwrap().copy();

        with_exclusive_access(|| {
            original.restore();
            let again = check().unwrap_err();
            assert!(again.value().unwrap().is(&value));
        });
    }

    #[test]
    fn test_restore_host_and_bad_type() {
        with_exclusive_access(|| {
            PyError::from_host("backend unavailable").restore();
            let err = check().unwrap_err();
            assert!(err.is(ExceptionKind::RuntimeError));
            assert_eq!(err.to_string(), "RuntimeError: backend unavailable");

            PyError::BadType { expected: "str", found: "int".into() }.restore();
            let err = check().unwrap_err();
            assert!(err.is(ExceptionKind::TypeError));
            assert_eq!(err.to_string(), "TypeError: expected str, found int");
        });
    }

    #[test]
    fn test_display_appends_traceback() {
        let namespace = run("def inner():\n    raise KeyError('k')\n").unwrap();
        let err = namespace.get_item("inner").unwrap().call0().unwrap_err();

        let text = err.to_string();
        assert!(text.starts_with("KeyError: 'k'\nTraceback (most recent call last):\n"));
        assert!(text.contains("inner"));

        let debug = format!("{err:?}");
        assert!(debug.starts_with("Exception"));
        assert!(debug.contains("KeyError"));
    }

    #[test]
    fn test_error_values_are_cloneable() {
        let err = PyError::new(ExceptionKind::IndexError, "out of range");
        let clone = err.clone();
        assert!(clone.value().unwrap().is(err.value().unwrap()));
        assert_eq!(clone.to_string(), err.to_string());
    }
}

#[cfg(test)]
mod tracking_tests {
    use super::*;

    fn failure(message: &str) -> PyError {
        PyError::new(ExceptionKind::ValueError, message)
    }

    #[test]
    fn test_clean_scope_passes_value_through() {
        assert_eq!(with_error_tracking(|| Ok(7)).unwrap(), 7);
        assert!(!is_tracking());
    }

    #[test]
    fn test_tracked_report_surfaces() {
        let err = with_error_tracking(|| {
            report_tracked(failure("tracked"));
            assert!(tracked_error_pending());
            Ok(())
        })
        .unwrap_err();
        assert!(err.to_string().contains("tracked"));
    }

    #[test]
    fn test_first_report_wins() {
        let err = with_error_tracking(|| {
            report_tracked(failure("first"));
            report_tracked(failure("second"));
            Ok(())
        })
        .unwrap_err();
        assert!(err.to_string().ends_with("first"));
    }

    #[test]
    fn test_explicit_error_takes_precedence() {
        let err = with_error_tracking(|| -> PyResult<()> {
            report_tracked(failure("tracked"));
            Err(failure("explicit"))
        })
        .unwrap_err();
        assert!(err.to_string().ends_with("explicit"));
    }

    #[test]
    fn test_slot_is_empty_after_scope() {
        let _ = with_error_tracking(|| -> PyResult<()> {
            report_tracked(failure("leftover"));
            Ok(())
        });

        with_error_tracking(|| {
            assert!(!tracked_error_pending());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_nested_scopes_are_independent() {
        let outer = with_error_tracking(|| {
            let inner = with_error_tracking(|| {
                report_tracked(failure("inner"));
                Ok(())
            });
            assert!(inner.is_err());
            assert!(!tracked_error_pending());
            Ok(())
        });
        assert!(outer.is_ok());
    }

    #[test]
    fn test_tracked_substitutes_fallback() {
        let outcome = with_error_tracking(|| {
            let value = tracked(Err(failure("nope")), || -1);
            assert_eq!(value, -1);
            Ok(value)
        });
        assert!(outcome.is_err());
    }

    #[test]
    fn test_scope_closed_by_panic() {
        let result = std::panic::catch_unwind(|| {
            with_error_tracking(|| -> PyResult<()> {
                report_tracked(failure("unwound"));
                panic!("unwinding");
            })
        });
        assert!(result.is_err());
        assert!(!is_tracking());
    }

    #[test]
    #[should_panic(expected = "outside with_error_tracking")]
    fn test_report_outside_scope_panics() {
        report_tracked(failure("orphan"));
    }

    #[test]
    #[should_panic(expected = "observed outside with_error_tracking")]
    fn test_observe_outside_scope_panics() {
        tracked_error_pending();
    }

    #[test]
    fn test_tracked_scope_with_foreign_operations() {
        let err = with_error_tracking(|| {
            let list = vec![1_i64].into_foreign()?;
            assert!(list.item(3_i64).is_none());
            Ok(())
        })
        .unwrap_err();
        assert!(err.is(ExceptionKind::IndexError));
    }
}
