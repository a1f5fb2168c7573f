//! Reference counting tests for `ForeignRef`
//!
//! Counts are only compared as deltas on freshly created lists: small ints,
//! `None` and interned strings are immortal on newer interpreters.

use super::*;
use crate::context::{is_held, with_exclusive_access};
use crate::interpreter::eval;

fn fresh() -> ForeignRef {
    eval("[]").unwrap()
}

#[cfg(test)]
mod ownership_tests {
    use super::*;

    #[test]
    fn test_copy_retains_once() {
        let obj = fresh();
        let base = obj.refcount();

        let copies: Vec<_> = (0..3).map(|_| obj.copy()).collect();
        assert_eq!(obj.refcount(), base + 3);
        assert!(copies.iter().all(|c| c.is(&obj)));

        with_exclusive_access(|| drop(copies));
        assert_eq!(obj.refcount(), base);
    }

    #[test]
    fn test_unmanaged_copies_never_touch_count() {
        let obj = fresh();
        let base = obj.refcount();

        let borrowed = unsafe { ForeignRef::borrowed(obj.as_non_null()) };
        assert!(!borrowed.is_managed());
        let copy = borrowed.copy();
        assert!(!copy.is_managed());
        assert_eq!(obj.refcount(), base);

        drop(copy);
        drop(borrowed);
        assert_eq!(obj.refcount(), base);
    }

    #[test]
    fn test_take_then_adopt_releases_once() {
        let obj = fresh();
        let base = obj.refcount();

        let raw = obj.copy().take();
        assert_eq!(obj.refcount(), base + 1);

        let adopted = unsafe { ForeignRef::adopt(raw) };
        assert_eq!(obj.refcount(), base + 1);

        with_exclusive_access(|| drop(adopted));
        assert_eq!(obj.refcount(), base);
    }

    #[test]
    fn test_take_of_borrowed_hands_out_owned_reference() {
        let obj = fresh();
        let base = obj.refcount();

        let borrowed = unsafe { ForeignRef::borrowed(obj.as_non_null()) };
        let raw = borrowed.take();
        assert_eq!(obj.refcount(), base + 1);

        drop(unsafe { ForeignRef::adopt(raw) });
        assert_eq!(obj.refcount(), base);
    }

    #[test]
    fn test_identity_is_pointer_equality() {
        let a = fresh();
        let b = fresh();
        assert!(a.is(&a.copy()));
        assert!(!a.is(&b));
        assert!(ForeignRef::none().is(&ForeignRef::none()));
    }
}

#[cfg(test)]
mod deferred_release_tests {
    use super::*;

    #[test]
    fn test_drop_without_access_is_deferred() {
        let obj = fresh();
        let base = obj.refcount();

        let copy = obj.copy();
        assert!(!is_held());
        drop(copy);

        // The next acquisition drains the pool before running anything
        assert_eq!(with_exclusive_access(|| obj.refcount()), base);
    }

    #[test]
    fn test_drop_with_access_is_immediate() {
        let obj = fresh();
        let base = obj.refcount();

        with_exclusive_access(|| {
            let copy = obj.copy();
            assert_eq!(obj.refcount(), base + 1);
            drop(copy);
            assert_eq!(obj.refcount(), base);
        });
    }

    #[test]
    fn test_deferred_releases_from_other_threads() {
        let obj = fresh();
        let base = obj.refcount();

        let copies: Vec<_> = (0..4).map(|_| obj.copy()).collect();
        let handles: Vec<_> = copies.into_iter().map(|copy| std::thread::spawn(move || drop(copy))).collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(with_exclusive_access(|| obj.refcount()), base);
    }
}

#[cfg(test)]
mod shared_tests {
    use super::*;

    #[test]
    fn test_shared_releases_on_last_drop() {
        let obj = fresh();
        let base = obj.refcount();

        let shared = SharedRef::new(obj.copy());
        let clones: Vec<_> = (0..3).map(|_| shared.clone()).collect();
        assert_eq!(shared.holders(), 4);
        assert_eq!(obj.refcount(), base + 1);

        with_exclusive_access(|| {
            drop(clones);
            assert_eq!(obj.refcount(), base + 1);
            drop(shared);
            assert_eq!(obj.refcount(), base);
        });
    }

    #[test]
    fn test_shared_to_foreign_is_independent() {
        let shared = SharedRef::new(fresh());
        let owned = shared.to_foreign();
        assert!(owned.is(&shared));
        assert!(owned.is_managed());
    }
}
