//! An in-memory [`Toolkit`] that records what the engine asks of it.
//!
//! Native objects live in a single `SlotMap`; parent/child links are stored in secondary
//! maps so handles stay stable and stale handles are detectable.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt::Write as _;
use std::rc::Rc;

use slotmap::{SecondaryMap, SlotMap};

use crate::toolkit::{NativeCallback, NativeHandle, NativeKind, Placement, PropValue, Toolkit};

/// One recorded toolkit call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolkitCall {
    Create {
        handle: NativeHandle,
        kind: NativeKind,
    },
    SetProperty {
        handle: NativeHandle,
        name: &'static str,
        value: PropValue,
    },
    Attach {
        parent: NativeHandle,
        child: NativeHandle,
        placement: Placement,
    },
    Detach {
        parent: NativeHandle,
        child: NativeHandle,
    },
    Destroy {
        handle: NativeHandle,
    },
    PresentRoot {
        handle: NativeHandle,
    },
    ConnectSignal {
        handle: NativeHandle,
        signal: &'static str,
    },
}

struct NativeObject {
    kind: NativeKind,
    properties: Vec<(&'static str, PropValue)>,
    signals: Vec<(&'static str, NativeCallback)>,
    placement: Option<Placement>,
}

impl NativeObject {
    fn set(&mut self, name: &'static str, value: PropValue) {
        match self.properties.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => *slot = value,
            None => self.properties.push((name, value)),
        }
    }
}

#[derive(Default)]
struct Arena {
    objects: SlotMap<NativeHandle, NativeObject>,
    children: SecondaryMap<NativeHandle, Vec<NativeHandle>>,
    parent: SecondaryMap<NativeHandle, NativeHandle>,
    root: Option<NativeHandle>,
    log: Vec<ToolkitCall>,
}

impl Arena {
    fn unlink(&mut self, child: NativeHandle) {
        if let Some(parent) = self.parent.remove(child) {
            if let Some(siblings) = self.children.get_mut(parent) {
                siblings.retain(|&sibling| sibling != child);
            }
        }
        if let Some(object) = self.objects.get_mut(child) {
            object.placement = None;
        }
    }

    fn remove_subtree(&mut self, handle: NativeHandle) {
        self.unlink(handle);
        if self.root == Some(handle) {
            self.root = None;
        }
        let mut queue = VecDeque::from([handle]);
        while let Some(current) = queue.pop_front() {
            if let Some(kids) = self.children.remove(current) {
                queue.extend(kids);
            }
            self.parent.remove(current);
            self.objects.remove(current);
        }
    }

    fn walk(&self, start: NativeHandle) -> Vec<NativeHandle> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !self.objects.contains_key(current) {
                continue;
            }
            result.push(current);
            if let Some(kids) = self.children.get(current) {
                stack.extend(kids.iter().rev());
            }
        }
        result
    }
}

// ---------------------------------------------------------------------------
// HeadlessToolkit
// ---------------------------------------------------------------------------

/// A toolkit with no screen: native objects are plain records.
///
/// # Examples
///
/// ```ignore
/// let toolkit = Rc::new(HeadlessToolkit::new());
/// let button = toolkit.find_by_kind(NativeKind::Button)[0];
/// toolkit.emit(button, "clicked", PropValue::Bool(true));
/// ```
#[derive(Default)]
pub struct HeadlessToolkit {
    arena: RefCell<Arena>,
}

impl HeadlessToolkit {
    /// An empty toolkit.
    pub fn new() -> Self {
        Self::default()
    }

    // ── Call log ─────────────────────────────────────────────────────

    /// Every call recorded since the last [`take_calls`](Self::take_calls).
    pub fn calls(&self) -> Vec<ToolkitCall> {
        self.arena.borrow().log.clone()
    }

    /// Drain the call log.
    pub fn take_calls(&self) -> Vec<ToolkitCall> {
        std::mem::take(&mut self.arena.borrow_mut().log)
    }

    /// Number of calls recorded since the last drain.
    pub fn call_count(&self) -> usize {
        self.arena.borrow().log.len()
    }

    // ── Inspection ───────────────────────────────────────────────────

    /// Whether `handle` is alive.
    pub fn contains(&self, handle: NativeHandle) -> bool {
        self.arena.borrow().objects.contains_key(handle)
    }

    /// Number of live native objects.
    pub fn len(&self) -> usize {
        self.arena.borrow().objects.len()
    }

    /// Whether no native objects are alive.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self, handle: NativeHandle) -> Option<NativeKind> {
        self.arena.borrow().objects.get(handle).map(|object| object.kind)
    }

    /// The current value of a property.
    pub fn property(&self, handle: NativeHandle, name: &str) -> Option<PropValue> {
        let arena = self.arena.borrow();
        let object = arena.objects.get(handle)?;
        object
            .properties
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.clone())
    }

    pub fn children(&self, handle: NativeHandle) -> Vec<NativeHandle> {
        self.arena
            .borrow()
            .children
            .get(handle)
            .cloned()
            .unwrap_or_default()
    }

    pub fn parent(&self, handle: NativeHandle) -> Option<NativeHandle> {
        self.arena.borrow().parent.get(handle).copied()
    }

    /// Where `handle` is attached inside its parent.
    pub fn placement(&self, handle: NativeHandle) -> Option<Placement> {
        self.arena.borrow().objects.get(handle)?.placement
    }

    /// The presented root.
    pub fn root(&self) -> Option<NativeHandle> {
        self.arena.borrow().root
    }

    /// Objects of `kind` reachable from the root, in depth-first order.
    pub fn find_by_kind(&self, kind: NativeKind) -> Vec<NativeHandle> {
        let arena = self.arena.borrow();
        let Some(root) = arena.root else {
            return Vec::new();
        };
        let found = arena
            .walk(root)
            .into_iter()
            .filter(|&handle| arena.objects[handle].kind == kind)
            .collect();
        found
    }

    // ── Simulated user input ─────────────────────────────────────────

    /// Fire the native signal `signal` on `handle`. Returns how many callbacks ran.
    ///
    /// Callbacks run with no internal borrow held, so they may call back into the
    /// toolkit.
    pub fn emit(&self, handle: NativeHandle, signal: &str, value: PropValue) -> usize {
        let callbacks: Vec<NativeCallback> = match self.arena.borrow().objects.get(handle) {
            Some(object) => object
                .signals
                .iter()
                .filter(|(name, _)| *name == signal)
                .map(|(_, callback)| Rc::clone(callback))
                .collect(),
            None => {
                tracing::debug!(?handle, signal, "emit on a destroyed object");
                return 0;
            }
        };
        for callback in &callbacks {
            callback(&value);
        }
        callbacks.len()
    }

    /// Change a property as the user would, without logging a call.
    pub fn set_native_property(&self, handle: NativeHandle, name: &'static str, value: PropValue) {
        if let Some(object) = self.arena.borrow_mut().objects.get_mut(handle) {
            object.set(name, value);
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    /// The presented tree as indented text, one object per line.
    pub fn render_tree(&self) -> String {
        let arena = self.arena.borrow();
        let mut out = String::new();
        let Some(root) = arena.root else {
            return out;
        };
        let mut stack = vec![(root, 0_usize)];
        while let Some((handle, depth)) = stack.pop() {
            let Some(object) = arena.objects.get(handle) else {
                continue;
            };
            let _ = write!(out, "{:indent$}{}", "", object.kind, indent = depth * 2);
            for (name, value) in &object.properties {
                let _ = write!(out, " {name}={value}");
            }
            if let Some(placement @ Placement::Cell { .. }) = object.placement {
                let _ = write!(out, " @ {placement}");
            }
            out.push('\n');
            if let Some(kids) = arena.children.get(handle) {
                stack.extend(kids.iter().rev().map(|&kid| (kid, depth + 1)));
            }
        }
        out
    }
}

impl Toolkit for HeadlessToolkit {
    fn create(&self, kind: NativeKind, init: &[(&'static str, PropValue)]) -> NativeHandle {
        let mut arena = self.arena.borrow_mut();
        let handle = arena.objects.insert(NativeObject {
            kind,
            properties: init.to_vec(),
            signals: Vec::new(),
            placement: None,
        });
        arena.children.insert(handle, Vec::new());
        arena.log.push(ToolkitCall::Create { handle, kind });
        handle
    }

    fn set_property(&self, handle: NativeHandle, name: &'static str, value: PropValue) {
        let mut arena = self.arena.borrow_mut();
        debug_assert!(arena.objects.contains_key(handle), "set_property on a dead object");
        if let Some(object) = arena.objects.get_mut(handle) {
            object.set(name, value.clone());
        }
        arena.log.push(ToolkitCall::SetProperty { handle, name, value });
    }

    fn attach_child(&self, parent: NativeHandle, child: NativeHandle, placement: Placement) {
        let mut arena = self.arena.borrow_mut();
        debug_assert!(arena.objects.contains_key(parent), "attach to a dead parent");
        debug_assert!(arena.objects.contains_key(child), "attach of a dead child");
        arena.unlink(child);
        if let Some(object) = arena.objects.get_mut(child) {
            object.placement = Some(placement);
        }
        arena.parent.insert(child, parent);
        if let Some(siblings) = arena.children.get_mut(parent) {
            siblings.push(child);
        }
        arena.log.push(ToolkitCall::Attach {
            parent,
            child,
            placement,
        });
    }

    fn detach_child(&self, parent: NativeHandle, child: NativeHandle) {
        let mut arena = self.arena.borrow_mut();
        if arena.parent.get(child) == Some(&parent) {
            arena.unlink(child);
        }
        arena.log.push(ToolkitCall::Detach { parent, child });
    }

    fn destroy(&self, handle: NativeHandle) {
        let mut arena = self.arena.borrow_mut();
        arena.remove_subtree(handle);
        arena.log.push(ToolkitCall::Destroy { handle });
    }

    fn present_root(&self, handle: NativeHandle) {
        let mut arena = self.arena.borrow_mut();
        arena.root = Some(handle);
        arena.log.push(ToolkitCall::PresentRoot { handle });
    }

    fn connect_signal(&self, handle: NativeHandle, signal: &'static str, callback: NativeCallback) {
        let mut arena = self.arena.borrow_mut();
        if let Some(object) = arena.objects.get_mut(handle) {
            object.signals.push((signal, callback));
        }
        arena.log.push(ToolkitCall::ConnectSignal { handle, signal });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Offset, Size};
    use std::cell::Cell;

    fn window_with_label(toolkit: &HeadlessToolkit) -> (NativeHandle, NativeHandle) {
        let window = toolkit.create(NativeKind::Window, &[("title", "Main".into())]);
        let label = toolkit.create(NativeKind::Label, &[("text", "hi".into())]);
        toolkit.attach_child(window, label, Placement::Content);
        toolkit.present_root(window);
        (window, label)
    }

    #[test]
    fn records_calls_in_order() {
        let toolkit = HeadlessToolkit::new();
        let (window, label) = window_with_label(&toolkit);
        assert_eq!(
            toolkit.take_calls(),
            vec![
                ToolkitCall::Create { handle: window, kind: NativeKind::Window },
                ToolkitCall::Create { handle: label, kind: NativeKind::Label },
                ToolkitCall::Attach { parent: window, child: label, placement: Placement::Content },
                ToolkitCall::PresentRoot { handle: window },
            ]
        );
        assert_eq!(toolkit.call_count(), 0);
    }

    #[test]
    fn destroy_removes_subtree() {
        let toolkit = HeadlessToolkit::new();
        let (window, label) = window_with_label(&toolkit);
        toolkit.destroy(window);
        assert!(!toolkit.contains(window));
        assert!(!toolkit.contains(label));
        assert!(toolkit.is_empty());
        assert_eq!(toolkit.root(), None);
    }

    #[test]
    fn detach_keeps_child_alive() {
        let toolkit = HeadlessToolkit::new();
        let (window, label) = window_with_label(&toolkit);
        toolkit.detach_child(window, label);
        assert!(toolkit.contains(label));
        assert_eq!(toolkit.parent(label), None);
        assert!(toolkit.children(window).is_empty());
    }

    #[test]
    fn emit_runs_matching_callbacks() {
        let toolkit = HeadlessToolkit::new();
        let button = toolkit.create(NativeKind::Button, &[]);
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        toolkit.connect_signal(
            button,
            "clicked",
            Rc::new(move |_: &PropValue| counter.set(counter.get() + 1)),
        );

        assert_eq!(toolkit.emit(button, "clicked", PropValue::Bool(true)), 1);
        assert_eq!(toolkit.emit(button, "toggled", PropValue::Bool(true)), 0);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn native_edits_are_not_logged() {
        let toolkit = HeadlessToolkit::new();
        let input = toolkit.create(NativeKind::TextInput, &[("text", "".into())]);
        toolkit.take_calls();
        toolkit.set_native_property(input, "text", "typed".into());
        assert_eq!(toolkit.property(input, "text"), Some(PropValue::from("typed")));
        assert_eq!(toolkit.call_count(), 0);
    }

    #[test]
    fn render_tree_shows_cells() {
        let toolkit = HeadlessToolkit::new();
        let (window, _) = window_with_label(&toolkit);
        let grid = toolkit.create(NativeKind::Grid, &[]);
        let cell = toolkit.create(NativeKind::Button, &[("label", "ok".into())]);
        toolkit.attach_child(window, grid, Placement::Content);
        toolkit.attach_child(
            grid,
            cell,
            Placement::Cell { origin: Offset::new(1, 0), size: Size::new(2, 1) },
        );

        insta::assert_snapshot!(toolkit.render_tree(), @r#"
        Window title="Main"
          Label text="hi"
          Grid
            Button label="ok" @ (1,0) 2x1
        "#);
    }
}
