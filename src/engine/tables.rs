//! Generational state arena.
//!
//! States live in the *active* table (the generation produced by the last completed
//! pass). During a pass every stateful widget encountered moves its state into the
//! *staging* table. Promotion replaces the active table with staging, so any state whose
//! key did not recur is dropped.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::rc::Rc;

use crate::identity::Key;

/// One engine-owned state and the tag describing its type.
#[derive(Clone)]
pub struct StateSlot {
    pub(crate) state: Rc<dyn Any>,
    pub(crate) state_type: TypeId,
    pub(crate) widget: &'static str,
}

impl StateSlot {
    pub(crate) fn new(state: Rc<dyn Any>, state_type: TypeId, widget: &'static str) -> Self {
        Self {
            state,
            state_type,
            widget,
        }
    }
}

/// The active generation plus the generation being built.
#[derive(Default)]
pub struct StateTables {
    active: HashMap<Key, StateSlot>,
    staging: HashMap<Key, StateSlot>,
}

impl StateTables {
    /// Empty tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// The state `key` held in the previous generation, if its type matches.
    pub(crate) fn previous(&self, key: &Key, state_type: TypeId) -> Option<Rc<dyn Any>> {
        self.active
            .get(key)
            .filter(|slot| slot.state_type == state_type)
            .map(|slot| Rc::clone(&slot.state))
    }

    /// The slot already staged under `key` during this pass.
    pub(crate) fn staged(&self, key: &Key) -> Option<&StateSlot> {
        self.staging.get(key)
    }

    /// Record `slot` in the generation being built.
    pub(crate) fn stage(&mut self, key: Key, slot: StateSlot) {
        self.staging.insert(key, slot);
    }

    /// Make staging the active generation. Returns the number of states dropped.
    pub fn promote(&mut self) -> usize {
        let previous = std::mem::replace(&mut self.active, std::mem::take(&mut self.staging));
        previous
            .iter()
            .filter(|(key, slot)| {
                let survived = self
                    .active
                    .get(*key)
                    .is_some_and(|next| Rc::ptr_eq(&next.state, &slot.state));
                if !survived {
                    tracing::trace!(key = %key, widget = slot.widget, "state dropped");
                }
                !survived
            })
            .count()
    }

    /// Throw away the generation being built (after a failed pass).
    pub fn discard_staging(&mut self) {
        self.staging.clear();
    }

    /// Number of states in the active generation.
    pub fn live_count(&self) -> usize {
        self.active.len()
    }

    /// Number of states staged so far in the current pass.
    pub fn staged_count(&self) -> usize {
        self.staging.len()
    }
}
