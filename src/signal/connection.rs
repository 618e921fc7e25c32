//! Connections: (signal, handler) pairs and ordered groups of them.

use std::any::Any;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use super::handler::{Handler, HandlerIdentity, Propagation};
use super::id::{ErasedSignal, SignalId};

/// Mixing constant for [`hash_combine`] (64-bit golden ratio).
const GOLDEN_RATIO: u64 = 0x9e37_79b9_7f4a_7c15;

/// Order-sensitive hash mixing: folds `value` into the accumulator `seed`.
pub fn hash_combine(seed: u64, value: u64) -> u64 {
    seed ^ value
        .wrapping_add(GOLDEN_RATIO)
        .wrapping_add(seed << 6)
        .wrapping_add(seed >> 2)
}

fn hash_one<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

// ---------------------------------------------------------------------------
// SignalConnection
// ---------------------------------------------------------------------------

/// One handler attached to one signal, with both types erased.
#[derive(Clone)]
pub struct SignalConnection {
    signal: ErasedSignal,
    handler: Rc<dyn Any>,
    handler_identity: HandlerIdentity,
}

impl SignalConnection {
    /// Pair `handler` with `signal`.
    pub fn new<T: 'static>(signal: &SignalId<T>, handler: Handler<T>) -> Self {
        Self {
            signal: signal.erase(),
            handler_identity: handler.identity(),
            handler: Rc::new(handler),
        }
    }

    /// The signal this connection listens to.
    pub fn signal(&self) -> &ErasedSignal {
        &self.signal
    }

    /// Identity of the connected handler.
    pub fn handler_identity(&self) -> HandlerIdentity {
        self.handler_identity
    }

    /// The typed handler, if this connection is for `signal`.
    pub fn handler_for<T: 'static>(&self, signal: &SignalId<T>) -> Option<&Handler<T>> {
        if self.signal.is(signal) {
            self.handler.downcast_ref::<Handler<T>>()
        } else {
            None
        }
    }
}

impl PartialEq for SignalConnection {
    fn eq(&self, other: &Self) -> bool {
        self.signal == other.signal && self.handler_identity == other.handler_identity
    }
}

impl Eq for SignalConnection {}

impl Hash for SignalConnection {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(hash_combine(
            hash_one(&self.signal),
            hash_one(&self.handler_identity),
        ));
    }
}

impl fmt::Debug for SignalConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalConnection")
            .field("signal", &self.signal)
            .field("handler", &self.handler_identity)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// SignalConnectionGroup
// ---------------------------------------------------------------------------

/// An ordered list of connections, compared and hashed structurally.
///
/// Groups built from handlers with stable identities compare equal across rebuilds, which
/// is how a node decides that its handler set is unchanged.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SignalConnectionGroup {
    connections: Vec<SignalConnection>,
}

impl SignalConnectionGroup {
    /// An empty group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a connection (builder).
    pub fn connect<T: 'static>(mut self, signal: &SignalId<T>, handler: Handler<T>) -> Self {
        self.push(signal, handler);
        self
    }

    /// Append a connection.
    pub fn push<T: 'static>(&mut self, signal: &SignalId<T>, handler: Handler<T>) {
        self.connections.push(SignalConnection::new(signal, handler));
    }

    /// Number of connections.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Whether the group has no connections.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// All connections in order.
    pub fn iter(&self) -> impl Iterator<Item = &SignalConnection> {
        self.connections.iter()
    }

    /// Handlers connected to `signal`, in connection order.
    pub fn handlers<'a, T: 'static>(
        &'a self,
        signal: &'a SignalId<T>,
    ) -> impl Iterator<Item = &'a Handler<T>> + 'a {
        self.connections
            .iter()
            .filter_map(move |connection| connection.handler_for(signal))
    }

    /// Invoke every handler connected to `signal` with `payload`, in order.
    ///
    /// Returns [`Propagation::Stop`] if a handler stopped dispatch early.
    pub fn emit<T: 'static>(&self, signal: &SignalId<T>, payload: &T) -> Propagation {
        for handler in self.handlers(signal) {
            if handler.call(payload) == Propagation::Stop {
                return Propagation::Stop;
            }
        }
        Propagation::Continue
    }

    /// Order-sensitive hash of every connection, seeded at 0.
    pub fn combined_hash(&self) -> u64 {
        self.connections
            .iter()
            .fold(0, |seed, connection| hash_combine(seed, hash_one(connection)))
    }
}

impl Hash for SignalConnectionGroup {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.combined_hash());
    }
}

impl fmt::Debug for SignalConnectionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.connections).finish()
    }
}
