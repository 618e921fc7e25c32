//! [`BuildContext`]: expansion, node diffing, state generations, rebuild coalescing.
//!
//! One build pass:
//!
//! 1. mark the engine as building,
//! 2. expand the root widget to a render widget (it must be a [`Window`]),
//! 3. diff it against the root node, presenting a replacement if one was made,
//! 4. promote the staged state generation,
//! 5. clear the building mark.
//!
//! State mutations made between passes are applied immediately and coalesce into a single
//! idle-priority rebuild.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::app::AppConfig;
use crate::error::{ReconcileError, Result};
use crate::identity::Key;
use crate::render::{self, downcast_widget, NodeRef};
use crate::toolkit::{IdleToken, RunLoop, Toolkit};
use crate::widget::{AnyStatefulWidget, RenderWidget, Widget};
use crate::widgets::Window;

use super::tables::{StateSlot, StateTables};

// ---------------------------------------------------------------------------
// EngineCore
// ---------------------------------------------------------------------------

pub(crate) struct EngineCore {
    max_iterations: usize,
    default_title: Option<String>,
    toolkit: Rc<dyn Toolkit>,
    run_loop: Rc<dyn RunLoop>,
    root_widget: Widget,
    tables: RefCell<StateTables>,
    root: RefCell<Option<NodeRef>>,
    building: Cell<bool>,
    pending: Cell<Option<IdleToken>>,
    passes: Cell<u64>,
    this: Weak<EngineCore>,
}

impl Drop for EngineCore {
    fn drop(&mut self) {
        if let Some(token) = self.pending.take() {
            tracing::debug!(?token, "engine dropped, cancelling pending rebuild");
            self.run_loop.cancel_idle(token);
        }
    }
}

/// Clears the building flag even when a pass fails part-way.
struct BuildingGuard<'a>(&'a Cell<bool>);

impl<'a> BuildingGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        BuildingGuard(flag)
    }
}

impl Drop for BuildingGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

// ---------------------------------------------------------------------------
// BuildContext
// ---------------------------------------------------------------------------

/// Handle to the reconciliation engine, passed to every build function.
///
/// Cloning is cheap; all clones drive the same engine. Dropping the last handle (and the
/// last state handle) cancels a pending rebuild.
#[derive(Clone)]
pub struct BuildContext {
    core: Rc<EngineCore>,
}

impl BuildContext {
    /// Create an engine for `root` on top of `toolkit` and `run_loop`.
    ///
    /// No pass runs until [`run_build_pass`](Self::run_build_pass) is called.
    pub fn new(
        config: &AppConfig,
        toolkit: Rc<dyn Toolkit>,
        run_loop: Rc<dyn RunLoop>,
        root: Widget,
    ) -> Result<Self> {
        config.validate()?;
        let core = Rc::new_cyclic(|this| EngineCore {
            max_iterations: config.max_expansion_iterations,
            default_title: config.title.clone(),
            toolkit,
            run_loop,
            root_widget: root,
            tables: RefCell::new(StateTables::new()),
            root: RefCell::new(None),
            building: Cell::new(false),
            pending: Cell::new(None),
            passes: Cell::new(0),
            this: this.clone(),
        });
        Ok(Self { core })
    }

    pub(crate) fn from_core(core: Rc<EngineCore>) -> Self {
        Self { core }
    }

    pub(crate) fn downgrade(&self) -> Weak<EngineCore> {
        Rc::downgrade(&self.core)
    }

    /// The native toolkit nodes talk to.
    pub fn toolkit(&self) -> &Rc<dyn Toolkit> {
        &self.core.toolkit
    }

    /// Title applied to windows that do not set one.
    pub fn default_title(&self) -> Option<&str> {
        self.core.default_title.as_deref()
    }

    // ── Expansion ────────────────────────────────────────────────────

    /// Expand `widget` through its stateless and stateful layers to a render widget.
    ///
    /// Each layer counts as one iteration; exceeding the configured bound is an
    /// [`ReconcileError::ExpansionCycle`].
    pub fn build(&self, widget: &Widget) -> Result<Rc<dyn RenderWidget>> {
        let limit = self.core.max_iterations;
        let mut current = widget.clone();
        // Keys this expansion chain staged; meeting one again is a cycle, not a duplicate.
        let mut chain: Vec<Key> = Vec::new();

        for _ in 0..limit {
            current = match current {
                Widget::Render(render) => return Ok(render),
                Widget::Stateless(stateless) => stateless.build(self),
                Widget::Stateful(stateful) => {
                    let state = self.state_for(stateful.as_ref(), &mut chain)?;
                    stateful.build_erased(&state, self)
                }
            };
        }

        if let Widget::Render(render) = current {
            return Ok(render);
        }
        tracing::error!(widget = widget.name(), limit, "expansion did not terminate");
        Err(ReconcileError::ExpansionCycle {
            widget: widget.name().to_owned(),
            iterations: limit,
        })
    }

    /// Find (or create) the state for a stateful widget and stage it for this pass.
    fn state_for(
        &self,
        widget: &dyn AnyStatefulWidget,
        chain: &mut Vec<Key>,
    ) -> Result<Rc<dyn std::any::Any>> {
        let key = widget.key();
        let state_type = widget.state_type();

        if let Some(slot) = self.core.tables.borrow().staged(&key) {
            if chain.contains(&key) && slot.state_type == state_type {
                return Ok(Rc::clone(&slot.state));
            }
            return Err(ReconcileError::DuplicateKey {
                key: format!("{key} ({})", widget.name()),
            });
        }

        let previous = self.core.tables.borrow().previous(&key, state_type);
        let state = match previous {
            Some(state) => state,
            None => {
                tracing::trace!(key = %key, widget = widget.name(), "creating state");
                widget.create_state(self)
            }
        };

        self.core.tables.borrow_mut().stage(
            key.clone(),
            StateSlot::new(Rc::clone(&state), state_type, widget.name()),
        );
        chain.push(key);
        Ok(state)
    }

    // ── Diffing ──────────────────────────────────────────────────────

    /// Diff an already-expanded render widget against `existing`.
    ///
    /// Creates a node when there is none. `on_change` runs only when the resulting node
    /// is not `existing` (by pointer), so callers can splice the replacement in.
    pub fn update_render_node(
        &self,
        existing: Option<&NodeRef>,
        widget: &Rc<dyn RenderWidget>,
        on_change: impl FnOnce(&NodeRef),
    ) -> Result<NodeRef> {
        let node = match existing {
            Some(node) => render::apply(node, self, widget)?,
            None => Rc::clone(widget).create_node(self)?,
        };
        let changed = existing.map_or(true, |old| !Rc::ptr_eq(old, &node));
        if changed {
            tracing::trace!(widget = widget.name(), "node replaced");
            on_change(&node);
        }
        Ok(node)
    }

    /// Expand `widget` and diff the result against `existing`.
    ///
    /// See [`update_render_node`](Self::update_render_node) for when `on_change` runs.
    pub fn update_node_if_necessary(
        &self,
        existing: Option<&NodeRef>,
        widget: &Widget,
        on_change: impl FnOnce(&NodeRef),
    ) -> Result<NodeRef> {
        let render = self.build(widget)?;
        self.update_render_node(existing, &render, on_change)
    }

    // ── Passes ───────────────────────────────────────────────────────

    /// Run one full build pass over the root widget.
    pub fn run_build_pass(&self) -> Result<()> {
        let core = &self.core;
        let result = {
            let _building = BuildingGuard::enter(&core.building);
            self.reconcile_root()
        };

        match result {
            Ok(root_replaced) => {
                let dropped = core.tables.borrow_mut().promote();
                let pass = core.passes.get() + 1;
                core.passes.set(pass);
                tracing::debug!(
                    pass,
                    live_states = self.live_state_count(),
                    dropped,
                    root_replaced,
                    "build pass complete"
                );
                Ok(())
            }
            Err(err) => {
                core.tables.borrow_mut().discard_staging();
                Err(err)
            }
        }
    }

    /// Steps 2 and 3 of a pass. Returns whether the root node was replaced.
    fn reconcile_root(&self) -> Result<bool> {
        let render = self.build(&self.core.root_widget)?;
        if downcast_widget::<Window>(&render).is_none() {
            return Err(ReconcileError::RootNotWindow {
                found: render.name().to_owned(),
            });
        }

        let existing = self.core.root.borrow().clone();
        let toolkit = Rc::clone(&self.core.toolkit);
        let mut replaced = false;
        let node = self.update_render_node(existing.as_ref(), &render, |node| {
            if let Some(old) = &existing {
                toolkit.destroy(old.borrow().handle());
            }
            toolkit.present_root(node.borrow().handle());
            replaced = true;
        })?;
        *self.core.root.borrow_mut() = Some(node);
        Ok(replaced)
    }

    fn run_scheduled_pass(&self) {
        let result = self.run_build_pass();
        self.core.pending.set(None);
        if let Err(err) = result {
            tracing::error!(%err, "scheduled build pass failed");
            panic!("{err}");
        }
    }

    // ── Mutation ─────────────────────────────────────────────────────

    /// Apply `mutator` now and make sure exactly one rebuild is pending.
    ///
    /// Requests made before the scheduled rebuild runs share that rebuild, which sees all
    /// of their effects.
    ///
    /// # Panics
    ///
    /// Panics when called during a build pass; defer such mutations until the pass
    /// completes.
    pub fn request_mutation(&self, mutator: impl FnOnce()) {
        let core = &self.core;
        if core.building.get() {
            tracing::error!("state mutated during a build pass");
            panic!("{}", ReconcileError::MutationDuringBuild);
        }

        mutator();

        if core.pending.get().is_some() {
            tracing::trace!("rebuild already pending, mutation coalesced");
            return;
        }
        let engine = core.this.clone();
        let token = core.run_loop.schedule_idle(Box::new(move || {
            if let Some(core) = engine.upgrade() {
                BuildContext::from_core(core).run_scheduled_pass();
            }
        }));
        tracing::trace!(?token, "rebuild scheduled");
        core.pending.set(Some(token));
    }

    // ── Inspection ───────────────────────────────────────────────────

    /// Whether a build pass is running.
    pub fn is_building(&self) -> bool {
        self.core.building.get()
    }

    /// Whether a rebuild is scheduled but has not run.
    pub fn has_pending_rebuild(&self) -> bool {
        self.core.pending.get().is_some()
    }

    /// Number of completed build passes.
    pub fn pass_count(&self) -> u64 {
        self.core.passes.get()
    }

    /// Number of states kept alive by the last completed pass.
    pub fn live_state_count(&self) -> usize {
        self.core.tables.borrow().live_count()
    }

    /// The root node, once a pass has completed.
    pub fn root_node(&self) -> Option<NodeRef> {
        self.core.root.borrow().clone()
    }
}

impl fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildContext")
            .field("passes", &self.pass_count())
            .field("building", &self.is_building())
            .field("pending_rebuild", &self.has_pending_rebuild())
            .field("live_states", &self.live_state_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::StateHandle;
    use crate::testing::{self, ManualRunLoop};
    use crate::widget::{Builder, StatefulWidget, StatelessWidget};
    use crate::widgets::{Label, Window};
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    // ── Fixtures ─────────────────────────────────────────────────────

    /// Rebuilds into itself forever.
    #[derive(Clone)]
    struct Mirror {
        builds: Rc<Cell<usize>>,
    }

    impl StatelessWidget for Mirror {
        fn build(&self, _ctx: &BuildContext) -> Widget {
            self.builds.set(self.builds.get() + 1);
            Widget::stateless(self.clone())
        }
    }

    /// `depth` stateless layers over a label.
    struct Layers(usize);

    impl StatelessWidget for Layers {
        fn build(&self, _ctx: &BuildContext) -> Widget {
            match self.0 {
                0 => Label::new("bottom").into(),
                n => Widget::stateless(Layers(n - 1)),
            }
        }
    }

    /// Reports the handle it was built with.
    struct Probe<S: Clone + 'static> {
        key: &'static str,
        initial: S,
        seen: Rc<RefCell<Option<StateHandle<S>>>>,
    }

    impl<S: Clone + 'static> StatefulWidget for Probe<S> {
        type State = S;

        fn key(&self) -> Key {
            Key::structural(self.key)
        }

        fn create_state(&self) -> S {
            self.initial.clone()
        }

        fn build(&self, state: &StateHandle<S>, _ctx: &BuildContext) -> Widget {
            *self.seen.borrow_mut() = Some(state.clone());
            Label::new("probe").into()
        }
    }

    type Seen<S> = Rc<RefCell<Option<StateHandle<S>>>>;

    fn probe<S: Clone + 'static>(key: &'static str, initial: S, seen: &Seen<S>) -> Widget {
        Widget::stateful(Probe {
            key,
            initial,
            seen: Rc::clone(seen),
        })
    }

    fn seen<S: 'static>(slot: &Seen<S>) -> StateHandle<S> {
        slot.borrow().clone().unwrap()
    }

    // ── Expansion ────────────────────────────────────────────────────

    #[test]
    fn render_widget_expands_to_itself() {
        let (ctx, _, _) = testing::context(Window::new());
        let render = ctx.build(&Label::new("leaf").into()).unwrap();
        assert_eq!(render.name(), "Label");
    }

    #[test]
    fn self_returning_widget_hits_bound_exactly() {
        let (ctx, _, _) = testing::context(Window::new());
        let builds = Rc::new(Cell::new(0));
        let mirror = Widget::stateless(Mirror {
            builds: Rc::clone(&builds),
        });

        let err = ctx.build(&mirror).unwrap_err();
        assert_eq!(builds.get(), 500);
        assert!(matches!(err, ReconcileError::ExpansionCycle { iterations: 500, .. }));
    }

    #[test]
    fn configured_bound_is_respected() {
        let config = AppConfig::new().with_max_expansion_iterations(3);
        let (ctx, _, _) = testing::context_with(&config, Window::new());
        assert!(ctx.build(&Widget::stateless(Layers(3))).is_ok());
        assert!(matches!(
            ctx.build(&Widget::stateless(Layers(4))),
            Err(ReconcileError::ExpansionCycle { .. })
        ));
    }

    // ── State generations ────────────────────────────────────────────

    #[test]
    fn state_survives_while_key_recurs() {
        let slot = Seen::<u32>::default();
        let root = {
            let slot = Rc::clone(&slot);
            Builder::new(move |_| Window::new().child(probe("k", 0_u32, &slot)).into())
        };
        let (ctx, _, _) = testing::context(root);

        ctx.run_build_pass().unwrap();
        let first = seen(&slot);
        ctx.run_build_pass().unwrap();
        assert!(seen(&slot).ptr_eq(&first));
        assert_eq!(ctx.live_state_count(), 1);
    }

    #[test]
    fn state_is_fresh_after_key_is_absent_for_a_pass() {
        let slot = Seen::<u32>::default();
        let present = Rc::new(Cell::new(true));
        let root = {
            let (slot, present) = (Rc::clone(&slot), Rc::clone(&present));
            Builder::new(move |_| {
                let window = Window::new();
                if present.get() {
                    window.child(probe("k", 0_u32, &slot)).into()
                } else {
                    window.into()
                }
            })
        };
        let (ctx, _, _) = testing::context(root);

        ctx.run_build_pass().unwrap();
        let first = seen(&slot);
        present.set(false);
        ctx.run_build_pass().unwrap();
        assert_eq!(ctx.live_state_count(), 0);
        present.set(true);
        ctx.run_build_pass().unwrap();
        assert!(!seen(&slot).ptr_eq(&first));
    }

    #[test]
    fn key_reused_with_other_state_type_gets_fresh_state() {
        let numbers = Seen::<u32>::default();
        let words = Seen::<String>::default();
        let as_words = Rc::new(Cell::new(false));
        let root = {
            let (numbers, words, as_words) =
                (Rc::clone(&numbers), Rc::clone(&words), Rc::clone(&as_words));
            Builder::new(move |_| {
                let child = if as_words.get() {
                    probe("k", "fresh".to_owned(), &words)
                } else {
                    probe("k", 7_u32, &numbers)
                };
                Window::new().child(child).into()
            })
        };
        let (ctx, _, _) = testing::context(root);

        ctx.run_build_pass().unwrap();
        as_words.set(true);
        ctx.run_build_pass().unwrap();
        assert_eq!(seen(&words).get(), "fresh");
    }

    #[test]
    fn duplicate_stateful_keys_fail_the_pass() {
        let first = Seen::<u32>::default();
        let second = Seen::<u32>::default();
        let root = {
            let (first, second) = (Rc::clone(&first), Rc::clone(&second));
            Builder::new(move |ctx| {
                // Expand a sibling under the same key before building our own child.
                let _ = ctx.build(&probe("k", 0_u32, &first));
                Window::new().child(probe("k", 0_u32, &second)).into()
            })
        };
        let (ctx, _, _) = testing::context(root);
        assert!(matches!(
            ctx.run_build_pass(),
            Err(ReconcileError::DuplicateKey { .. })
        ));
        assert_eq!(ctx.live_state_count(), 0);
    }

    #[test]
    fn failed_pass_keeps_previous_generation() {
        let slot = Seen::<u32>::default();
        let broken = Rc::new(Cell::new(false));
        let root = {
            let (slot, broken) = (Rc::clone(&slot), Rc::clone(&broken));
            Builder::new(move |_| {
                if broken.get() {
                    Label::new("not a window").into()
                } else {
                    Window::new().child(probe("k", 0_u32, &slot)).into()
                }
            })
        };
        let (ctx, _, _) = testing::context(root);

        ctx.run_build_pass().unwrap();
        broken.set(true);
        assert!(ctx.run_build_pass().is_err());
        assert_eq!(ctx.live_state_count(), 1);
        assert_eq!(ctx.pass_count(), 1);
        assert!(!ctx.is_building());
    }

    // ── Mutation ─────────────────────────────────────────────────────

    #[test]
    fn mutations_coalesce_into_one_pass() {
        let slot = Seen::<u32>::default();
        let root = {
            let slot = Rc::clone(&slot);
            Builder::new(move |_| Window::new().child(probe("k", 0_u32, &slot)).into())
        };
        let (ctx, _, run_loop) = testing::context(root);
        ctx.run_build_pass().unwrap();

        let state = seen(&slot);
        for _ in 0..5 {
            state.set_state(|n| *n += 1);
        }
        assert_eq!(state.get(), 5);
        assert!(ctx.has_pending_rebuild());
        assert_eq!(run_loop.pending_count(), 1);

        assert_eq!(run_loop.run_idle(), 1);
        assert_eq!(ctx.pass_count(), 2);
        assert!(!ctx.has_pending_rebuild());
    }

    #[test]
    #[should_panic(expected = "state mutation requested during a build pass")]
    fn mutation_during_build_panics() {
        let slot = Seen::<u32>::default();
        let root = {
            let slot = Rc::clone(&slot);
            Builder::new(move |_| {
                if let Some(state) = slot.borrow().as_ref() {
                    state.set_state(|n| *n += 1);
                }
                Window::new().child(probe("k", 0_u32, &slot)).into()
            })
        };
        let (ctx, _, _) = testing::context(root);
        ctx.run_build_pass().unwrap();
        ctx.run_build_pass().unwrap();
    }

    #[test]
    fn dropping_engine_cancels_pending_rebuild() {
        let slot = Seen::<u32>::default();
        let root = {
            let slot = Rc::clone(&slot);
            Builder::new(move |_| Window::new().child(probe("k", 0_u32, &slot)).into())
        };
        let run_loop = Rc::new(ManualRunLoop::new());
        let ctx = BuildContext::new(
            &AppConfig::default(),
            Rc::new(testing::HeadlessToolkit::new()),
            run_loop.clone(),
            root.into(),
        )
        .unwrap();
        ctx.run_build_pass().unwrap();

        let state = seen(&slot);
        state.set_state(|n| *n = 9);
        assert_eq!(run_loop.pending_count(), 1);
        drop(ctx);
        assert_eq!(run_loop.pending_count(), 0);

        // The orphaned handle still mutates, but nothing is scheduled.
        state.set_state(|n| *n += 1);
        assert_eq!(state.get(), 10);
        assert_eq!(run_loop.pending_count(), 0);
    }

    #[test]
    fn root_title_change_updates_in_place() {
        let titled = Rc::new(Cell::new(false));
        let root = {
            let titled = Rc::clone(&titled);
            Builder::new(move |_| {
                if titled.get() {
                    Window::new().title("second").into()
                } else {
                    Window::new().title("first").into()
                }
            })
        };
        let (ctx, toolkit, _) = testing::context(root);
        ctx.run_build_pass().unwrap();
        let root = ctx.root_node().unwrap();
        toolkit.take_calls();

        titled.set(true);
        ctx.run_build_pass().unwrap();
        assert!(Rc::ptr_eq(&root, &ctx.root_node().unwrap()));
        assert_eq!(toolkit.take_calls().len(), 1);
    }
}
