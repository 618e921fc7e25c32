//! Declared signal tokens.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::identity::Identity;

// ---------------------------------------------------------------------------
// SignalId
// ---------------------------------------------------------------------------

/// A declared event channel whose handlers receive `&T`.
///
/// Two `SignalId`s are equal only if they come from the same declaration. Declare each
/// signal once, typically in a `static`:
///
/// ```ignore
/// pub static CLICKED: LazyLock<SignalId<Clicked>> = LazyLock::new(|| SignalId::declare("clicked"));
/// ```
pub struct SignalId<T: 'static> {
    identity: Identity,
    name: &'static str,
    _marker: PhantomData<fn(&T)>,
}

// Manual impls so T needs neither Copy nor Clone.
impl<T: 'static> Copy for SignalId<T> {}
impl<T: 'static> Clone for SignalId<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> SignalId<T> {
    /// Declare a new signal. Every call yields a distinct signal.
    pub fn declare(name: &'static str) -> Self {
        Self {
            identity: Identity::new(),
            name,
            _marker: PhantomData,
        }
    }

    /// The name given at declaration (diagnostics only; not part of identity).
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The signal's identity token.
    pub fn identity(&self) -> Identity {
        self.identity
    }

    /// Forget the payload type, keeping it as a tag.
    pub fn erase(&self) -> ErasedSignal {
        ErasedSignal {
            identity: self.identity,
            payload: TypeId::of::<T>(),
            name: self.name,
        }
    }
}

impl<T: 'static> PartialEq for SignalId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl<T: 'static> Eq for SignalId<T> {}

impl<T: 'static> Hash for SignalId<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity.hash(state);
    }
}

impl<T: 'static> fmt::Debug for SignalId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalId")
            .field("name", &self.name)
            .field("identity", &self.identity)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// ErasedSignal
// ---------------------------------------------------------------------------

/// A [`SignalId`] with its payload type reduced to a tag, for heterogeneous storage.
#[derive(Clone, Copy)]
pub struct ErasedSignal {
    identity: Identity,
    payload: TypeId,
    name: &'static str,
}

impl ErasedSignal {
    /// Whether this is the erased form of `signal`.
    pub fn is<T: 'static>(&self, signal: &SignalId<T>) -> bool {
        self.payload == TypeId::of::<T>() && self.identity == signal.identity
    }

    /// The declared name.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ErasedSignal {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity && self.payload == other.payload
    }
}

impl Eq for ErasedSignal {}

impl Hash for ErasedSignal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity.hash(state);
    }
}

impl fmt::Debug for ErasedSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:?}", self.name, self.identity)
    }
}
