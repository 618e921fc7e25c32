//! Widget keys: null, structural, and reference identity.
//!
//! Keys decide whether a widget seen in this build pass is "the same" widget as one
//! seen in the previous pass. Equal keys always hash equal.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use super::token::Identity;

/// Hash written for every [`Key::Null`].
const NULL_KEY_HASH: u64 = 0x6e75_6c6c_6b65_7900;

// ---------------------------------------------------------------------------
// Payload erasure
// ---------------------------------------------------------------------------

/// Object-safe view of a hashable key payload.
///
/// Comparison first checks the concrete type (the tag), then defers to the payload's
/// own `Eq`.
trait KeyPayload: Any {
    fn payload_eq(&self, other: &dyn KeyPayload) -> bool;
    fn payload_hash(&self, state: &mut dyn Hasher);
    fn payload_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + Eq + Hash + fmt::Debug> KeyPayload for T {
    fn payload_eq(&self, other: &dyn KeyPayload) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }

    fn payload_hash(&self, mut state: &mut dyn Hasher) {
        TypeId::of::<T>().hash(&mut state);
        self.hash(&mut state);
    }

    fn payload_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ---------------------------------------------------------------------------
// StructuralKey
// ---------------------------------------------------------------------------

/// A key whose identity is a hashable value.
#[derive(Clone)]
pub struct StructuralKey(Rc<dyn KeyPayload>);

impl StructuralKey {
    /// Wrap a payload.
    pub fn new<T: Any + Eq + Hash + fmt::Debug>(payload: T) -> Self {
        StructuralKey(Rc::new(payload))
    }

    /// Borrow the payload if it has type `T`.
    pub fn payload<T: Any>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }
}

impl PartialEq for StructuralKey {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0) || self.0.payload_eq(other.0.as_ref())
    }
}

impl Eq for StructuralKey {}

impl Hash for StructuralKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.payload_hash(state);
    }
}

impl fmt::Debug for StructuralKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.payload_debug(f)
    }
}

// ---------------------------------------------------------------------------
// Key
// ---------------------------------------------------------------------------

/// Identity attached to a widget description.
///
/// Within one set of siblings keys must be unique; the engine rejects duplicates it can
/// see (stateful widgets in one pass, grid siblings).
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Key {
    /// No explicit identity. Equal to every other null key.
    #[default]
    Null,
    /// The payload is the identity: equal iff payloads are equal.
    Structural(StructuralKey),
    /// Caller-supplied identity: equal only to copies of the same token.
    Reference(Identity),
}

impl Key {
    /// A fresh reference key, distinct from every other key.
    pub fn unique() -> Self {
        Key::Reference(Identity::new())
    }

    /// A structural key wrapping `payload`.
    pub fn structural<T: Any + Eq + Hash + fmt::Debug>(payload: T) -> Self {
        Key::Structural(StructuralKey::new(payload))
    }

    /// Derive a key from a widget's own content ("auto key").
    ///
    /// Two widgets of the same type with equal content get equal keys.
    pub fn auto<W: Any + Clone + Eq + Hash + fmt::Debug>(widget: &W) -> Self {
        Key::structural(widget.clone())
    }

    /// Whether this is the null key.
    pub fn is_null(&self) -> bool {
        matches!(self, Key::Null)
    }
}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Key::Null => state.write_u64(NULL_KEY_HASH),
            Key::Structural(payload) => payload.hash(state),
            Key::Reference(identity) => identity.hash(state),
        }
    }
}

impl From<Identity> for Key {
    fn from(identity: Identity) -> Self {
        Key::Reference(identity)
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Null => f.write_str("Key::Null"),
            Key::Structural(payload) => write!(f, "Key({payload:?})"),
            Key::Reference(identity) => write!(f, "Key({identity:?})"),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::collections::HashMap;

    fn hash_of(key: &Key) -> u64 {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        hasher.finish()
    }

    // ── Null ─────────────────────────────────────────────────────────

    #[test]
    fn null_keys_are_equal() {
        assert_eq!(Key::Null, Key::default());
        assert_eq!(hash_of(&Key::Null), hash_of(&Key::default()));
    }

    #[test]
    fn null_differs_from_other_variants() {
        assert_ne!(Key::Null, Key::unique());
        assert_ne!(Key::Null, Key::structural(0_u32));
    }

    #[test]
    fn is_null() {
        assert!(Key::Null.is_null());
        assert!(!Key::unique().is_null());
    }

    // ── Structural ───────────────────────────────────────────────────

    #[test]
    fn structural_equal_payloads() {
        let a = Key::structural("counter");
        let b = Key::structural("counter");
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn structural_different_payloads() {
        assert_ne!(Key::structural(1_i32), Key::structural(2_i32));
    }

    #[test]
    fn structural_different_types_never_equal() {
        // Same bit pattern, different concrete type.
        assert_ne!(Key::structural(1_u32), Key::structural(1_i32));
    }

    #[test]
    fn structural_payload_access() {
        let key = StructuralKey::new(String::from("slot"));
        assert_eq!(key.payload::<String>().map(String::as_str), Some("slot"));
        assert!(key.payload::<u8>().is_none());
    }

    #[test]
    fn auto_key_from_widget_content() {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        struct Counter {
            label: &'static str,
        }
        let a = Key::auto(&Counter { label: "a" });
        let a2 = Key::auto(&Counter { label: "a" });
        let b = Key::auto(&Counter { label: "b" });
        assert_eq!(a, a2);
        assert_ne!(a, b);
    }

    // ── Reference ────────────────────────────────────────────────────

    #[test]
    fn reference_keys_compare_by_token() {
        let a = Key::unique();
        let b = Key::unique();
        assert_ne!(a, b);
        assert_eq!(a.clone(), a);
        assert_eq!(hash_of(&a), hash_of(&a.clone()));
    }

    #[test]
    fn reference_from_identity() {
        let id = Identity::new();
        assert_eq!(Key::from(id), Key::Reference(id));
    }

    // ── Map usage ────────────────────────────────────────────────────

    #[test]
    fn keys_work_as_map_keys() {
        let custom = Key::unique();
        let mut map = HashMap::new();
        map.insert(Key::Null, 0);
        map.insert(Key::structural("x"), 1);
        map.insert(custom.clone(), 2);

        assert_eq!(map.get(&Key::Null), Some(&0));
        assert_eq!(map.get(&Key::structural("x")), Some(&1));
        assert_eq!(map.get(&custom), Some(&2));
        assert_eq!(map.get(&Key::unique()), None);
    }

    #[test]
    fn debug_format() {
        assert_eq!(format!("{:?}", Key::Null), "Key::Null");
        assert_eq!(format!("{:?}", Key::structural(7_u8)), "Key(7)");
    }
}
