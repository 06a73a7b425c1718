//! Strongly-typed element identifiers.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique [`ElementId`] allocation.
static ELEMENT_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique per-instance identifier for a beamline element.
///
/// Allocated from a monotonic atomic counter via [`ElementId::next`]. Two
/// distinct element instances always have different ids, even when their
/// physics content is identical. A split remainder produced by the beamline's
/// overlap resolution refers to the element it was carved out of through this
/// id rather than through a shared pointer, so splitting never creates shared
/// mutable state.
///
/// Cloning an element preserves its id: a clone is a snapshot of the same
/// logical element, not a new one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u64);

impl ElementId {
    /// Allocate a fresh, unique element id.
    pub fn next() -> Self {
        Self(ELEMENT_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = ElementId::next();
        let b = ElementId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn ids_are_monotonic() {
        let a = ElementId::next();
        let b = ElementId::next();
        assert!(b > a);
    }
}
