use super::*;
use crate::convert::{extract, IntoForeign};
use crate::error::{tracked_error_pending, with_error_tracking, ExceptionKind, PyError};
use crate::interpreter::{eval, run};

#[test]
fn test_str_repr_and_type_name() {
    let text = "quote's".into_foreign().unwrap();
    assert_eq!(text.str().unwrap(), "quote's");
    assert_eq!(text.repr().unwrap(), "\"quote's\"");
    assert_eq!(text.type_name(), "str");
    assert_eq!(ForeignRef::none().type_name(), "NoneType");
}

#[test]
fn test_truthiness_and_instances() {
    assert!(!eval("[]").unwrap().is_truthy().unwrap());
    assert!(eval("[0]").unwrap().is_truthy().unwrap());

    let value = 3_i64.into_foreign().unwrap();
    let int_type = value.get_type();
    assert!(value.is_instance(&int_type).unwrap());
    assert!(int_type.is_callable());
    assert!(!value.is_callable());
}

#[test]
fn test_attributes() {
    let namespace = eval("__import__('types').SimpleNamespace(a=1)").unwrap();
    assert!(namespace.hasattr("a"));
    assert!(!namespace.hasattr("b"));

    namespace.setattr("b", &"two".into_foreign().unwrap()).unwrap();
    assert_eq!(extract::<String>(&namespace.getattr("b").unwrap()).unwrap(), "two");

    namespace.delattr("a").unwrap();
    let err = namespace.getattr("a").unwrap_err();
    assert!(err.is(ExceptionKind::AttributeError));
}

#[test]
fn test_items_and_mapping() {
    let map = eval("{'x': 1}").unwrap();
    map.set_item("y", 2_i64).unwrap();
    assert_eq!(map.len().unwrap(), 2);
    assert!(map.contains("y").unwrap());
    assert_eq!(extract::<i64>(&map.get_item("y").unwrap()).unwrap(), 2);

    let mut keys = extract::<Vec<String>>(&map.keys().unwrap()).unwrap();
    keys.sort();
    assert_eq!(keys, ["x", "y"]);
    assert_eq!(map.items().unwrap().len().unwrap(), 2);
    assert_eq!(extract::<Vec<i64>>(&map.values().unwrap()).unwrap().iter().sum::<i64>(), 3);

    map.del_item("x").unwrap();
    let err = map.get_item("x").unwrap_err();
    assert!(err.is(ExceptionKind::KeyError));
}

#[test]
fn test_sequence_index_error() {
    let list = eval("[10, 20]").unwrap();
    assert_eq!(extract::<i64>(&list.get_item(-1_i64).unwrap()).unwrap(), 20);
    assert!(list.get_item(5_i64).unwrap_err().is(ExceptionKind::IndexError));
}

#[test]
fn test_calls() {
    let namespace = run("def f(a, b=0, *, scale=1):\n    return (a + b) * scale\n").unwrap();
    let f = namespace.get_item("f").unwrap();

    let one = 1_i64.into_foreign().unwrap();
    let two = 2_i64.into_foreign().unwrap();
    assert_eq!(extract::<i64>(&f.call(&[one.copy()]).unwrap()).unwrap(), 1);
    assert_eq!(extract::<i64>(&f.call(&[one.copy(), two.copy()]).unwrap()).unwrap(), 3);

    let scaled = f.call_with_kwargs(&[one, two], &[("scale", 10_i64.into_foreign().unwrap())]).unwrap();
    assert_eq!(extract::<i64>(&scaled).unwrap(), 30);

    let err = f.call0().unwrap_err();
    assert!(err.is(ExceptionKind::TypeError));

    let text = "a-b".into_foreign().unwrap();
    let parts = text.call_method("split", &["-".into_foreign().unwrap()]).unwrap();
    assert_eq!(extract::<Vec<String>>(&parts).unwrap(), ["a", "b"]);
}

#[test]
fn test_tuple_and_dict_helpers() {
    let items = [1_i64.into_foreign().unwrap(), "b".into_foreign().unwrap()];
    let built = tuple(&items).unwrap();
    assert_eq!(built.type_name(), "tuple");
    assert_eq!(built.repr().unwrap(), "(1, 'b')");

    let built = dict([("k", 1_i64)]).unwrap();
    assert_eq!(built.repr().unwrap(), "{'k': 1}");
}

#[test]
fn test_comparisons() {
    let one = 1_i64.into_foreign().unwrap();
    let two = 2_i64.into_foreign().unwrap();

    assert!(one.compare(&two, CompareOp::Lt).unwrap());
    assert!(!one.compare(&two, CompareOp::Ge).unwrap());
    assert!(one.rich_compare(&two, CompareOp::Ne).unwrap().is_truthy().unwrap());

    let outcome = with_error_tracking(|| {
        assert!(one < two);
        assert!(one != two);
        assert!(one == 1_i64.into_foreign()?);
        assert_eq!(two.partial_cmp(&one), Some(core::cmp::Ordering::Greater));
        Ok(())
    });
    assert!(outcome.is_ok());
}

#[test]
fn test_failed_comparison_is_tracked() {
    let one = 1_i64.into_foreign().unwrap();
    let text = "a".into_foreign().unwrap();

    let outcome = with_error_tracking(|| {
        let ordered = one < text;
        assert!(!ordered);
        assert!(tracked_error_pending());
        Ok(())
    });
    assert!(outcome.unwrap_err().is(ExceptionKind::TypeError));
}

#[test]
#[should_panic(expected = "outside with_error_tracking")]
fn test_failed_comparison_outside_scope_panics() {
    let one = 1_i64.into_foreign().unwrap();
    let text = "a".into_foreign().unwrap();
    let _ = one < text;
}

#[test]
fn test_tracked_attr_and_item() {
    let list = eval("[1, 2]").unwrap();

    let outcome = with_error_tracking(|| {
        assert!(list.attr("append").is_some());
        assert!(list.item(0_i64).is_some());
        assert!(!tracked_error_pending());

        assert!(list.attr("missing").is_none());
        assert!(list.item(9_i64).is_none());
        Ok(())
    });

    // First report wins
    assert!(outcome.unwrap_err().is(ExceptionKind::AttributeError));
}

#[test]
fn test_iteration_is_lazy_and_finite() {
    let outcome = with_error_tracking(|| {
        let values: Vec<i64> = eval("range(4)")?.iter::<i64>()?.collect();
        assert_eq!(values, [0, 1, 2, 3]);

        let mut iter = eval("iter([1])")?.iter::<i64>()?;
        assert_eq!(iter.next(), Some(1));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next(), None);
        Ok(())
    });
    assert!(outcome.is_ok());
}

#[test]
fn test_iteration_skips_and_reports_bad_elements() {
    let outcome = with_error_tracking(|| {
        let values: Vec<i64> = eval("[1, 'two', 3]")?.iter::<i64>()?.collect();
        assert_eq!(values, [1, 3]);
        Ok(values)
    });
    assert!(matches!(outcome, Err(PyError::BadType { expected: "int", .. })));
}

#[test]
fn test_iteration_failure_ends_iteration() {
    let namespace = run("def gen():\n    yield 1\n    raise ValueError('stop here')\n").unwrap();
    let gen = namespace.get_item("gen").unwrap().call0().unwrap();

    let outcome = with_error_tracking(|| {
        let values: Vec<i64> = gen.iter::<i64>()?.collect();
        assert_eq!(values, [1]);
        Ok(())
    });
    assert!(outcome.unwrap_err().is(ExceptionKind::ValueError));
}

#[test]
fn test_iterating_non_iterable_fails() {
    let err = 5_i64.into_foreign().unwrap().iter::<i64>().err().unwrap();
    assert!(err.is(ExceptionKind::TypeError));
}

#[test]
fn test_lossy_forms_keep_pending_error() {
    with_exclusive_access(|| {
        let text = "visible".into_foreign().unwrap();
        PyError::new(ExceptionKind::ValueError, "pending").restore();
        assert_eq!(text.str_lossy(), "visible");
        assert_eq!(text.repr_lossy(), "'visible'");

        let pending = crate::error::check().unwrap_err();
        assert!(pending.is(ExceptionKind::ValueError));
    });
}
