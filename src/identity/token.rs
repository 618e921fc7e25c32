//! Allocation-scoped identity tokens.

use std::fmt;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_IDENTITY: AtomicU64 = AtomicU64::new(1);

/// An opaque token that is equal only to copies of itself.
///
/// Stands in for object identity: keys, declared signals, handlers, and states each
/// allocate one when created and compare by it afterwards. Tokens are never reused
/// within a process.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(NonZeroU64);

impl Identity {
    /// Allocate a fresh, never-before-seen identity.
    pub fn new() -> Self {
        let raw = NEXT_IDENTITY.fetch_add(1, Ordering::Relaxed);
        // The counter starts at 1 and would need 2^64 allocations to wrap.
        Identity(NonZeroU64::new(raw).unwrap_or(NonZeroU64::MIN))
    }

    /// The raw token value, stable for the lifetime of the process.
    pub fn as_u64(self) -> u64 {
        self.0.get()
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn fresh_identities_differ() {
        let a = Identity::new();
        let b = Identity::new();
        assert_ne!(a, b);
    }

    #[test]
    fn copies_are_equal() {
        let a = Identity::new();
        let b = a;
        assert_eq!(a, b);
        assert_eq!(a.as_u64(), b.as_u64());
    }

    #[test]
    fn identities_are_unique_in_sets() {
        let set: HashSet<Identity> = (0..100).map(|_| Identity::new()).collect();
        assert_eq!(set.len(), 100);
    }

    #[test]
    fn debug_format() {
        let id = Identity::new();
        assert_eq!(format!("{id:?}"), format!("#{}", id.as_u64()));
    }
}
