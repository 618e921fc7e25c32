//! Typed handles to engine-owned state.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::context::{BuildContext, EngineCore};
use crate::identity::Identity;
use crate::signal::Creator;

pub(crate) struct StateCell<S> {
    value: RefCell<S>,
    identity: Identity,
    engine: Weak<EngineCore>,
}

/// Shared handle to one state owned by the engine.
///
/// Handles are cheap to clone. Reading never triggers a rebuild; mutating through
/// [`set_state`](Self::set_state) does (coalesced with any other pending mutation).
pub struct StateHandle<S: 'static> {
    cell: Rc<StateCell<S>>,
}

impl<S: 'static> Clone for StateHandle<S> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
        }
    }
}

impl<S: 'static> StateHandle<S> {
    pub(crate) fn new(value: S, ctx: &BuildContext) -> Self {
        Self {
            cell: Rc::new(StateCell {
                value: RefCell::new(value),
                identity: Identity::new(),
                engine: ctx.downgrade(),
            }),
        }
    }

    pub(crate) fn erase(&self) -> Rc<dyn Any> {
        self.cell.clone()
    }

    pub(crate) fn from_erased(state: &Rc<dyn Any>) -> Option<Self> {
        Rc::clone(state)
            .downcast::<StateCell<S>>()
            .ok()
            .map(|cell| Self { cell })
    }

    /// Read the state by reference.
    pub fn with<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.cell.value.borrow())
    }

    /// Clone the current value.
    pub fn get(&self) -> S
    where
        S: Clone,
    {
        self.with(S::clone)
    }

    /// Mutate the state and request a rebuild.
    ///
    /// The mutation is applied immediately; the rebuild runs later on the host loop.
    /// Once the engine is gone the mutation is still applied but nothing rebuilds.
    ///
    /// # Panics
    ///
    /// Panics when called while a build pass is running.
    pub fn set_state(&self, mutate: impl FnOnce(&mut S)) {
        let apply = || mutate(&mut self.cell.value.borrow_mut());
        match self.cell.engine.upgrade() {
            Some(core) => BuildContext::from_core(core).request_mutation(apply),
            None => apply(),
        }
    }

    /// Stable identity of this state.
    pub fn identity(&self) -> Identity {
        self.cell.identity
    }

    /// Whether both handles point at the same state.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }
}

impl<S: 'static> Creator for StateHandle<S> {
    fn creator_identity(&self) -> Identity {
        self.cell.identity
    }
}

impl<S: fmt::Debug + 'static> fmt::Debug for StateHandle<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateHandle")
            .field("identity", &self.cell.identity)
            .field("value", &self.cell.value.borrow())
            .finish()
    }
}
