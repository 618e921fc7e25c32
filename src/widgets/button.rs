//! Button widget: a clickable label.
//!
//! The node subscribes to the native "clicked" event once, at creation, and dispatches
//! through whatever connection group the latest description carried. Rebuilding with an
//! equal group (stable handler identities) leaves the subscription untouched.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::LazyLock;

use crate::engine::BuildContext;
use crate::error::Result;
use crate::identity::Key;
use crate::render::{downcast_widget, new_node, replace_with, NodeRef, NodeUpdate, RenderNode};
use crate::signal::{Handler, SignalConnectionGroup, SignalId};
use crate::toolkit::{NativeHandle, NativeKind, PropValue};
use crate::widget::{RenderWidget, Widget};

/// Payload of [`CLICKED`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clicked;

/// Fired when the button is activated.
pub static CLICKED: LazyLock<SignalId<Clicked>> = LazyLock::new(|| SignalId::declare("clicked"));

// ---------------------------------------------------------------------------
// Button
// ---------------------------------------------------------------------------

/// A push button.
///
/// # Examples
///
/// ```ignore
/// let save = Button::new("Save").on_clicked(SAVE.bind(&state));
/// let locked = Button::new("Locked").sensitive(false);
/// ```
#[derive(Debug, Clone)]
pub struct Button {
    key: Key,
    label: String,
    sensitive: bool,
    connections: SignalConnectionGroup,
}

impl Button {
    /// Create a sensitive button with the given label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            key: Key::Null,
            label: label.into(),
            sensitive: true,
            connections: SignalConnectionGroup::new(),
        }
    }

    /// Set the key (builder).
    pub fn with_key(mut self, key: Key) -> Self {
        self.key = key;
        self
    }

    /// Set whether the button reacts to input (builder).
    pub fn sensitive(mut self, sensitive: bool) -> Self {
        self.sensitive = sensitive;
        self
    }

    /// Connect a handler to [`CLICKED`] (builder).
    pub fn on_clicked(self, handler: Handler<Clicked>) -> Self {
        self.connect(&CLICKED, handler)
    }

    /// Connect a handler to any signal (builder).
    pub fn connect<T: 'static>(mut self, signal: &SignalId<T>, handler: Handler<T>) -> Self {
        self.connections.push(signal, handler);
        self
    }

    /// The label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether the button reacts to input.
    pub fn is_sensitive(&self) -> bool {
        self.sensitive
    }

    /// The connected handlers.
    pub fn connections(&self) -> &SignalConnectionGroup {
        &self.connections
    }
}

impl RenderWidget for Button {
    fn key(&self) -> Key {
        self.key.clone()
    }

    fn name(&self) -> &'static str {
        "Button"
    }

    fn create_node(self: Rc<Self>, ctx: &BuildContext) -> Result<NodeRef> {
        let toolkit = ctx.toolkit();
        let handle = toolkit.create(
            NativeKind::Button,
            &[
                ("label", self.label.as_str().into()),
                ("sensitive", self.sensitive.into()),
            ],
        );

        let connections = Rc::new(RefCell::new(self.connections.clone()));
        let dispatch = Rc::clone(&connections);
        toolkit.connect_signal(
            handle,
            "clicked",
            Rc::new(move |_: &PropValue| {
                // Clone so handlers may trigger a rebuild that swaps the group.
                let group = dispatch.borrow().clone();
                group.emit(&CLICKED, &Clicked);
            }),
        );

        Ok(new_node(ButtonNode {
            handle,
            widget: self,
            connections,
            connection_changes: 0,
        }))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

impl From<Button> for Widget {
    fn from(button: Button) -> Self {
        Widget::render(button)
    }
}

// ---------------------------------------------------------------------------
// ButtonNode
// ---------------------------------------------------------------------------

/// Live counterpart of [`Button`].
pub struct ButtonNode {
    handle: NativeHandle,
    widget: Rc<Button>,
    connections: Rc<RefCell<SignalConnectionGroup>>,
    connection_changes: usize,
}

impl ButtonNode {
    /// The label currently applied.
    pub fn label(&self) -> &str {
        &self.widget.label
    }

    /// How many updates replaced the connection group with an unequal one.
    pub fn connection_changes(&self) -> usize {
        self.connection_changes
    }
}

impl RenderNode for ButtonNode {
    fn handle(&self) -> NativeHandle {
        self.handle
    }

    fn apply_changes(
        &mut self,
        ctx: &BuildContext,
        widget: &Rc<dyn RenderWidget>,
    ) -> Result<NodeUpdate> {
        let Some(next) = downcast_widget::<Button>(widget) else {
            return replace_with(ctx, widget);
        };
        let toolkit = ctx.toolkit();
        if next.label != self.widget.label {
            toolkit.set_property(self.handle, "label", next.label.as_str().into());
        }
        if next.sensitive != self.widget.sensitive {
            toolkit.set_property(self.handle, "sensitive", next.sensitive.into());
        }
        if *self.connections.borrow() != next.connections {
            tracing::trace!(
                handlers = next.connections.len(),
                "button handlers changed"
            );
            *self.connections.borrow_mut() = next.connections.clone();
            self.connection_changes += 1;
        }
        self.widget = next;
        Ok(NodeUpdate::KeepSelf)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use crate::signal::Propagation;
    use crate::testing;
    use pretty_assertions::assert_eq;

    fn counting(hits: &Rc<Cell<u32>>) -> Handler<Clicked> {
        let hits = Rc::clone(hits);
        Handler::new(move |_| {
            hits.set(hits.get() + 1);
            Propagation::Continue
        })
    }

    fn node_of(node: &NodeRef) -> std::cell::Ref<'_, dyn RenderNode> {
        node.borrow()
    }

    #[test]
    fn click_dispatches_to_handler() {
        let (ctx, toolkit, _) = testing::context(Button::new("unused"));
        let hits = Rc::new(Cell::new(0));
        let node = Rc::new(Button::new("Go").on_clicked(counting(&hits)))
            .create_node(&ctx)
            .unwrap();
        let handle = node.borrow().handle();

        assert_eq!(toolkit.emit(handle, "clicked", PropValue::Bool(true)), 1);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn equal_group_is_not_swapped() {
        let (ctx, _, _) = testing::context(Button::new("unused"));
        let hits = Rc::new(Cell::new(0));
        let handler = counting(&hits);
        let node = Rc::new(Button::new("Go").on_clicked(handler.clone()))
            .create_node(&ctx)
            .unwrap();

        let next: Rc<dyn RenderWidget> = Rc::new(Button::new("Go").on_clicked(handler));
        node.borrow_mut().apply_changes(&ctx, &next).unwrap();
        let changes = node_of(&node)
            .as_any()
            .downcast_ref::<ButtonNode>()
            .unwrap()
            .connection_changes();
        assert_eq!(changes, 0);
    }

    #[test]
    fn new_handler_replaces_dispatch_target() {
        let (ctx, toolkit, _) = testing::context(Button::new("unused"));
        let first = Rc::new(Cell::new(0));
        let second = Rc::new(Cell::new(0));
        let node = Rc::new(Button::new("Go").on_clicked(counting(&first)))
            .create_node(&ctx)
            .unwrap();
        let handle = node.borrow().handle();

        let next: Rc<dyn RenderWidget> = Rc::new(Button::new("Go").on_clicked(counting(&second)));
        node.borrow_mut().apply_changes(&ctx, &next).unwrap();
        toolkit.emit(handle, "clicked", PropValue::Bool(true));

        assert_eq!((first.get(), second.get()), (0, 1));
        let changes = node_of(&node)
            .as_any()
            .downcast_ref::<ButtonNode>()
            .unwrap()
            .connection_changes();
        assert_eq!(changes, 1);
    }

    #[test]
    fn sensitivity_change_is_pushed() {
        let (ctx, toolkit, _) = testing::context(Button::new("unused"));
        let node = Rc::new(Button::new("Go")).create_node(&ctx).unwrap();
        let handle = node.borrow().handle();

        let next: Rc<dyn RenderWidget> = Rc::new(Button::new("Go").sensitive(false));
        node.borrow_mut().apply_changes(&ctx, &next).unwrap();
        assert_eq!(toolkit.property(handle, "sensitive"), Some(PropValue::Bool(false)));
        assert_eq!(toolkit.property(handle, "label"), Some(PropValue::from("Go")));
    }
}
