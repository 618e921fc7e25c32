//! TextInput widget: a single-line editable field.
//!
//! The field is controlled: the description's text is what the native field should show.
//! Edits made natively are tracked by the node, so a rebuild that echoes the user's
//! own input back does not push it again.

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

/// Fired after every native edit, with the new text.
pub static CHANGED: LazyLock<SignalId<String>> = LazyLock::new(|| SignalId::declare("changed"));

/// Fired when the user submits the field (e.g. presses Enter), with the current text.
pub static ACTIVATED: LazyLock<SignalId<String>> =
    LazyLock::new(|| SignalId::declare("activate"));

// ---------------------------------------------------------------------------
// TextInput
// ---------------------------------------------------------------------------

/// An editable line of text.
///
/// # Examples
///
/// ```ignore
/// let name = TextInput::new()
///     .with_placeholder("Your name")
///     .with_text(state.get())
///     .on_changed(RENAME.bind(&state));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    key: Key,
    text: String,
    placeholder: String,
    password: bool,
    connections: SignalConnectionGroup,
}

impl TextInput {
    /// Create an empty field.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the key (builder).
    pub fn with_key(mut self, key: Key) -> Self {
        self.key = key;
        self
    }

    /// Set the text (builder).
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the placeholder text (builder).
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Mask the text (builder).
    pub fn password(mut self, password: bool) -> Self {
        self.password = password;
        self
    }

    /// Connect a handler to [`CHANGED`] (builder).
    pub fn on_changed(mut self, handler: Handler<String>) -> Self {
        self.connections.push(&CHANGED, handler);
        self
    }

    /// Connect a handler to [`ACTIVATED`] (builder).
    pub fn on_activated(mut self, handler: Handler<String>) -> Self {
        self.connections.push(&ACTIVATED, handler);
        self
    }

    /// The text.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl RenderWidget for TextInput {
    fn key(&self) -> Key {
        self.key.clone()
    }

    fn name(&self) -> &'static str {
        "TextInput"
    }

    fn create_node(self: Rc<Self>, ctx: &BuildContext) -> Result<NodeRef> {
        let toolkit = ctx.toolkit();
        let handle = toolkit.create(
            NativeKind::TextInput,
            &[
                ("text", self.text.as_str().into()),
                ("placeholder", self.placeholder.as_str().into()),
                ("visibility", (!self.password).into()),
            ],
        );

        let connections = Rc::new(RefCell::new(self.connections.clone()));
        let native_text = Rc::new(RefCell::new(self.text.clone()));

        let (group, text) = (Rc::clone(&connections), Rc::clone(&native_text));
        toolkit.connect_signal(
            handle,
            "changed",
            Rc::new(move |value: &PropValue| {
                let PropValue::Str(value) = value else {
                    tracing::debug!(%value, "ignoring non-text change");
                    return;
                };
                *text.borrow_mut() = value.clone();
                let group = group.borrow().clone();
                group.emit(&CHANGED, value);
            }),
        );

        let (group, text) = (Rc::clone(&connections), Rc::clone(&native_text));
        toolkit.connect_signal(
            handle,
            "activate",
            Rc::new(move |_: &PropValue| {
                let current = text.borrow().clone();
                let group = group.borrow().clone();
                group.emit(&ACTIVATED, &current);
            }),
        );

        Ok(new_node(TextInputNode {
            handle,
            widget: self,
            connections,
            native_text,
        }))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

impl From<TextInput> for Widget {
    fn from(input: TextInput) -> Self {
        Widget::render(input)
    }
}

// ---------------------------------------------------------------------------
// TextInputNode
// ---------------------------------------------------------------------------

/// Live counterpart of [`TextInput`].
pub struct TextInputNode {
    handle: NativeHandle,
    widget: Rc<TextInput>,
    connections: Rc<RefCell<SignalConnectionGroup>>,
    /// What the native field shows, including edits not yet described by a rebuild.
    native_text: Rc<RefCell<String>>,
}

impl TextInputNode {
    /// The text the native field shows.
    pub fn native_text(&self) -> String {
        self.native_text.borrow().clone()
    }
}

impl RenderNode for TextInputNode {
    fn handle(&self) -> NativeHandle {
        self.handle
    }

    fn apply_changes(
        &mut self,
        ctx: &BuildContext,
        widget: &Rc<dyn RenderWidget>,
    ) -> Result<NodeUpdate> {
        let Some(next) = downcast_widget::<TextInput>(widget) else {
            return replace_with(ctx, widget);
        };
        let toolkit = ctx.toolkit();

        let stale = *self.native_text.borrow() != next.text;
        if stale {
            toolkit.set_property(self.handle, "text", next.text.as_str().into());
            *self.native_text.borrow_mut() = next.text.clone();
        }
        if next.placeholder != self.widget.placeholder {
            toolkit.set_property(self.handle, "placeholder", next.placeholder.as_str().into());
        }
        if next.password != self.widget.password {
            toolkit.set_property(self.handle, "visibility", (!next.password).into());
        }
        if *self.connections.borrow() != next.connections {
            *self.connections.borrow_mut() = next.connections.clone();
        }
        self.widget = next;
        Ok(NodeUpdate::KeepSelf)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
