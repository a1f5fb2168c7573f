//! Shared foreign references
//!
//! `ForeignRef` is deliberately not `Clone`. Values that must be cloneable
//! (error values) hold a `SharedRef` instead; the last clone to drop releases
//! the inner reference.

use core::fmt;
use core::ops::Deref;
use std::sync::Arc;

use super::ForeignRef;

#[derive(Clone)]
pub struct SharedRef(Arc<ForeignRef>);

impl SharedRef {
    pub fn new(inner: ForeignRef) -> Self {
        Self(Arc::new(inner))
    }

    /// Fresh owned reference to the same object
    pub fn to_foreign(&self) -> ForeignRef {
        self.0.copy()
    }

    /// Number of host-side holders (for debugging/testing)
    pub fn holders(&self) -> usize {
        Arc::strong_count(&self.0)
    }
}

impl Deref for SharedRef {
    type Target = ForeignRef;

    fn deref(&self) -> &ForeignRef {
        &self.0
    }
}

impl From<ForeignRef> for SharedRef {
    fn from(inner: ForeignRef) -> Self {
        Self::new(inner)
    }
}

impl fmt::Debug for SharedRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}
