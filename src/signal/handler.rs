//! Handlers: callbacks compared by identity.
//!
//! A fresh closure is built every time a widget tree is rebuilt, so closures can never be
//! compared by value. Instead each [`Handler`] carries a [`HandlerIdentity`]: either its
//! own token, or (for handlers bound from an [`UnboundHandler`]) the pair of the unbound
//! method's token and the creator's token.

use std::fmt;
use std::rc::Rc;

use crate::identity::Identity;

// ---------------------------------------------------------------------------
// Propagation
// ---------------------------------------------------------------------------

/// Whether dispatch continues to the remaining handlers of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Propagation {
    /// Keep invoking later handlers.
    #[default]
    Continue,
    /// Skip every handler after this one.
    Stop,
}

// ---------------------------------------------------------------------------
// HandlerIdentity
// ---------------------------------------------------------------------------

/// What a handler is compared by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerIdentity {
    /// A standalone handler: equal only to clones of itself.
    Direct(Identity),
    /// A handler bound from an unbound method: equal to every binding of the same method
    /// to the same creator.
    Bound { method: Identity, creator: Identity },
}

// ---------------------------------------------------------------------------
// Handler
// ---------------------------------------------------------------------------

/// A callback for a signal with payload `T`.
pub struct Handler<T: 'static> {
    callback: Rc<dyn Fn(&T) -> Propagation>,
    identity: HandlerIdentity,
}

impl<T: 'static> Clone for Handler<T> {
    fn clone(&self) -> Self {
        Self {
            callback: Rc::clone(&self.callback),
            identity: self.identity,
        }
    }
}

impl<T: 'static> Handler<T> {
    /// Wrap a callback with a fresh identity.
    pub fn new(callback: impl Fn(&T) -> Propagation + 'static) -> Self {
        Self {
            callback: Rc::new(callback),
            identity: HandlerIdentity::Direct(Identity::new()),
        }
    }

    /// Invoke the callback.
    pub fn call(&self, payload: &T) -> Propagation {
        (self.callback)(payload)
    }

    /// The identity this handler compares by.
    pub fn identity(&self) -> HandlerIdentity {
        self.identity
    }
}

impl<T: 'static> PartialEq for Handler<T> {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl<T: 'static> Eq for Handler<T> {}

impl<T: 'static> fmt::Debug for Handler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handler").field(&self.identity).finish()
    }
}

// ---------------------------------------------------------------------------
// Creator / UnboundHandler
// ---------------------------------------------------------------------------

/// Something handlers can be bound to: it has a stable identity across rebuilds.
///
/// Implemented by [`StateHandle`](crate::engine::StateHandle).
pub trait Creator: Clone + 'static {
    /// The identity every binding to this creator shares.
    fn creator_identity(&self) -> Identity;
}

/// A method-like handler that is not yet attached to a creator.
///
/// Declare it once (usually in a `static`) and call [`bind`](Self::bind) inside build
/// functions; the bound handlers from successive rebuilds compare equal.
pub struct UnboundHandler<C, T: 'static> {
    method: fn(&C, &T) -> Propagation,
    identity: Identity,
}

impl<C, T: 'static> Clone for UnboundHandler<C, T> {
    fn clone(&self) -> Self {
        Self {
            method: self.method,
            identity: self.identity,
        }
    }
}

impl<C: Creator, T: 'static> UnboundHandler<C, T> {
    /// Declare an unbound handler around `method`.
    pub fn new(method: fn(&C, &T) -> Propagation) -> Self {
        Self {
            method,
            identity: Identity::new(),
        }
    }

    /// Bind to `creator`, producing a handler whose identity is (this method, creator).
    pub fn bind(&self, creator: &C) -> Handler<T> {
        let method = self.method;
        let identity = HandlerIdentity::Bound {
            method: self.identity,
            creator: creator.creator_identity(),
        };
        let creator = creator.clone();
        Handler {
            callback: Rc::new(move |payload: &T| method(&creator, payload)),
            identity,
        }
    }

    /// The identity of the unbound method.
    pub fn identity(&self) -> Identity {
        self.identity
    }
}

impl<C, T: 'static> fmt::Debug for UnboundHandler<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UnboundHandler").field(&self.identity).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Clone)]
    struct Owner {
        identity: Identity,
        hits: Rc<Cell<u32>>,
    }

    impl Owner {
        fn new() -> Self {
            Self {
                identity: Identity::new(),
                hits: Rc::new(Cell::new(0)),
            }
        }
    }

    impl Creator for Owner {
        fn creator_identity(&self) -> Identity {
            self.identity
        }
    }

    fn bump(owner: &Owner, by: &u32) -> Propagation {
        owner.hits.set(owner.hits.get() + by);
        Propagation::Continue
    }

    #[test]
    fn direct_handlers_compare_by_identity() {
        let a = Handler::new(|_: &u32| Propagation::Continue);
        let b = Handler::new(|_: &u32| Propagation::Continue);
        assert_ne!(a, b);
        assert_eq!(a.clone(), a);
    }

    #[test]
    fn call_invokes_callback() {
        let seen = Rc::new(Cell::new(0));
        let seen_c = seen.clone();
        let handler = Handler::new(move |v: &u32| {
            seen_c.set(*v);
            Propagation::Stop
        });
        assert_eq!(handler.call(&9), Propagation::Stop);
        assert_eq!(seen.get(), 9);
    }

    #[test]
    fn bindings_to_same_creator_are_equal() {
        let method = UnboundHandler::<Owner, u32>::new(bump);
        let owner = Owner::new();
        // Successive rebuilds bind afresh.
        let first = method.bind(&owner);
        let second = method.bind(&owner);
        assert_eq!(first, second);
    }

    #[test]
    fn bindings_to_different_creators_differ() {
        let method = UnboundHandler::<Owner, u32>::new(bump);
        let a = method.bind(&Owner::new());
        let b = method.bind(&Owner::new());
        assert_ne!(a, b);
    }

    #[test]
    fn different_methods_same_creator_differ() {
        let owner = Owner::new();
        let a = UnboundHandler::<Owner, u32>::new(bump).bind(&owner);
        let b = UnboundHandler::<Owner, u32>::new(bump).bind(&owner);
        assert_ne!(a, b);
    }

    #[test]
    fn bound_handler_calls_method_with_creator() {
        let owner = Owner::new();
        let handler = UnboundHandler::<Owner, u32>::new(bump).bind(&owner);
        handler.call(&2);
        handler.call(&3);
        assert_eq!(owner.hits.get(), 5);
    }

    #[test]
    fn bound_identity_shape() {
        let owner = Owner::new();
        let method = UnboundHandler::<Owner, u32>::new(bump);
        let handler = method.bind(&owner);
        assert_eq!(
            handler.identity(),
            HandlerIdentity::Bound {
                method: method.identity(),
                creator: owner.identity,
            }
        );
    }

    #[test]
    fn propagation_default_continue() {
        assert_eq!(Propagation::default(), Propagation::Continue);
    }
}
