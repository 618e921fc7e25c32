//! Label widget: a line of static text.

use std::any::Any;
use std::rc::Rc;

use crate::engine::BuildContext;
use crate::error::Result;
use crate::identity::Key;
use crate::render::{downcast_widget, new_node, replace_with, NodeRef, NodeUpdate, RenderNode};
use crate::toolkit::{NativeHandle, NativeKind};
use crate::widget::{RenderWidget, Widget};

// ---------------------------------------------------------------------------
// Label
// ---------------------------------------------------------------------------

/// Non-interactive text.
///
/// ```ignore
/// let title = Label::new("Settings").selectable(true);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    key: Key,
    text: String,
    selectable: bool,
}

impl Label {
    /// Create a label with the given text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            key: Key::Null,
            text: text.into(),
            selectable: false,
        }
    }

    /// Set the key (builder).
    pub fn with_key(mut self, key: Key) -> Self {
        self.key = key;
        self
    }

    /// Allow the user to select the text (builder).
    pub fn selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    /// The text.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl RenderWidget for Label {
    fn key(&self) -> Key {
        self.key.clone()
    }

    fn name(&self) -> &'static str {
        "Label"
    }

    fn create_node(self: Rc<Self>, ctx: &BuildContext) -> Result<NodeRef> {
        let handle = ctx.toolkit().create(
            NativeKind::Label,
            &[
                ("text", self.text.as_str().into()),
                ("selectable", self.selectable.into()),
            ],
        );
        Ok(new_node(LabelNode {
            handle,
            widget: self,
        }))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

impl From<Label> for Widget {
    fn from(label: Label) -> Self {
        Widget::render(label)
    }
}

// ---------------------------------------------------------------------------
// LabelNode
// ---------------------------------------------------------------------------

/// Live counterpart of [`Label`].
pub struct LabelNode {
    handle: NativeHandle,
    widget: Rc<Label>,
}

impl LabelNode {
    /// The text currently applied.
    pub fn text(&self) -> &str {
        &self.widget.text
    }
}

impl RenderNode for LabelNode {
    fn handle(&self) -> NativeHandle {
        self.handle
    }

    fn apply_changes(
        &mut self,
        ctx: &BuildContext,
        widget: &Rc<dyn RenderWidget>,
    ) -> Result<NodeUpdate> {
        let Some(next) = downcast_widget::<Label>(widget) else {
            return replace_with(ctx, widget);
        };
        let toolkit = ctx.toolkit();
        if next.text != self.widget.text {
            toolkit.set_property(self.handle, "text", next.text.as_str().into());
        }
        if next.selectable != self.widget.selectable {
            toolkit.set_property(self.handle, "selectable", next.selectable.into());
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
    use crate::testing::{self, ToolkitCall};
    use crate::toolkit::PropValue;
    use crate::widgets::Button;
    use pretty_assertions::assert_eq;

    fn render(widget: impl RenderWidget) -> Rc<dyn RenderWidget> {
        Rc::new(widget)
    }

    #[test]
    fn create_sets_initial_properties() {
        let (ctx, toolkit, _) = testing::context(Label::new("unused"));
        let node = render(Label::new("Hello").selectable(true))
            .create_node(&ctx)
            .unwrap();
        let handle = node.borrow().handle();
        assert_eq!(toolkit.kind(handle), Some(NativeKind::Label));
        assert_eq!(toolkit.property(handle, "text"), Some(PropValue::from("Hello")));
        assert_eq!(toolkit.property(handle, "selectable"), Some(PropValue::Bool(true)));
    }

    #[test]
    fn update_changes_only_text() {
        let (ctx, toolkit, _) = testing::context(Label::new("unused"));
        let node = render(Label::new("a")).create_node(&ctx).unwrap();
        let handle = node.borrow().handle();
        toolkit.take_calls();

        let update = node
            .borrow_mut()
            .apply_changes(&ctx, &render(Label::new("b")))
            .unwrap();
        assert!(matches!(update, NodeUpdate::KeepSelf));
        assert_eq!(
            toolkit.take_calls(),
            vec![ToolkitCall::SetProperty {
                handle,
                name: "text",
                value: PropValue::from("b"),
            }]
        );
    }

    #[test]
    fn identical_update_is_silent() {
        let (ctx, toolkit, _) = testing::context(Label::new("unused"));
        let node = render(Label::new("same")).create_node(&ctx).unwrap();
        toolkit.take_calls();
        node.borrow_mut()
            .apply_changes(&ctx, &render(Label::new("same")))
            .unwrap();
        assert!(toolkit.take_calls().is_empty());
    }

    #[test]
    fn foreign_widget_builds_replacement_without_mutation() {
        let (ctx, toolkit, _) = testing::context(Label::new("unused"));
        let node = render(Label::new("a")).create_node(&ctx).unwrap();
        toolkit.take_calls();

        let update = node
            .borrow_mut()
            .apply_changes(&ctx, &render(Button::new("b")))
            .unwrap();
        let NodeUpdate::NewNode(replacement) = update else {
            panic!("expected a replacement node");
        };
        let calls = toolkit.take_calls();
        assert!(calls.iter().all(|call| !matches!(call, ToolkitCall::SetProperty { handle, .. } if *handle == node.borrow().handle())));
        assert_eq!(
            toolkit.kind(replacement.borrow().handle()),
            Some(NativeKind::Button)
        );
        assert_eq!(node.borrow().as_any().downcast_ref::<LabelNode>().unwrap().text(), "a");
    }
}
