//! Unique, immutable view identity.
//!
//! Every bound view gets a [`ViewId`] at construction. Ids come from a
//! process-wide atomic counter, so they are unique across every application
//! root in the process and are never reused or reassigned.
//!
//! # Invariants
//!
//! 1. `ViewId::next()` never returns the same id twice within a process.
//! 2. Ids are opaque: ordering between ids carries no meaning beyond
//!    creation order and must not be relied on.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_VIEW_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque unique token identifying one bound view.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ViewId(u64);

impl ViewId {
    /// Allocate the next unique id.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_VIEW_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric form, for diagnostics only.
    #[must_use]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = ViewId::next();
        let b = ViewId::next();
        let c = ViewId::next();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    #[test]
    fn ids_are_monotonic() {
        let a = ViewId::next();
        let b = ViewId::next();
        assert!(b.as_u64() > a.as_u64());
    }

    #[test]
    fn display_form() {
        let id = ViewId::next();
        assert_eq!(id.to_string(), format!("view#{}", id.as_u64()));
    }

    #[test]
    fn copy_preserves_identity() {
        let a = ViewId::next();
        let b = a;
        assert_eq!(a, b);
    }
}
