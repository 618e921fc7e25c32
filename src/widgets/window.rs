//! Window widget: the root of every tree.

use std::any::Any;
use std::rc::Rc;

use crate::engine::BuildContext;
use crate::error::Result;
use crate::identity::Key;
use crate::render::{downcast_widget, new_node, replace_with, NodeRef, NodeUpdate, RenderNode};
use crate::toolkit::{NativeHandle, NativeKind, Placement, Toolkit};
use crate::widget::{RenderWidget, Widget};

// ---------------------------------------------------------------------------
// Window
// ---------------------------------------------------------------------------

/// A top-level window with at most one child.
///
/// A window without a title uses the application title, if one is configured.
///
/// # Examples
///
/// ```ignore
/// let root = Window::new()
///     .title("Counter")
///     .child(Label::new("0"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Window {
    key: Key,
    title: Option<String>,
    child: Option<Widget>,
}

impl Window {
    /// Create an empty, untitled window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the key (builder).
    pub fn with_key(mut self, key: Key) -> Self {
        self.key = key;
        self
    }

    /// Set the title (builder).
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the child (builder).
    pub fn child(mut self, child: impl Into<Widget>) -> Self {
        self.child = Some(child.into());
        self
    }

    fn effective_title(&self, ctx: &BuildContext) -> String {
        self.title
            .as_deref()
            .or_else(|| ctx.default_title())
            .unwrap_or_default()
            .to_owned()
    }
}

impl RenderWidget for Window {
    fn key(&self) -> Key {
        self.key.clone()
    }

    fn name(&self) -> &'static str {
        "Window"
    }

    fn create_node(self: Rc<Self>, ctx: &BuildContext) -> Result<NodeRef> {
        let title = self.effective_title(ctx);
        let handle = ctx
            .toolkit()
            .create(NativeKind::Window, &[("title", title.as_str().into())]);
        let mut node = WindowNode {
            handle,
            title,
            widget: Rc::clone(&self),
            child: None,
        };
        if let Err(err) = node.sync_child(ctx, self.child.as_ref()) {
            ctx.toolkit().destroy(handle);
            return Err(err);
        }
        Ok(new_node(node))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

impl From<Window> for Widget {
    fn from(window: Window) -> Self {
        Widget::render(window)
    }
}

// ---------------------------------------------------------------------------
// WindowNode
// ---------------------------------------------------------------------------

/// Live counterpart of [`Window`].
pub struct WindowNode {
    handle: NativeHandle,
    title: String,
    widget: Rc<Window>,
    child: Option<NodeRef>,
}

impl WindowNode {
    /// The title currently applied, after the application fallback.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The child node, if any.
    pub fn child(&self) -> Option<&NodeRef> {
        self.child.as_ref()
    }

    /// The description this node last applied.
    pub fn widget(&self) -> &Rc<Window> {
        &self.widget
    }

    fn sync_child(&mut self, ctx: &BuildContext, next: Option<&Widget>) -> Result<()> {
        let toolkit: &Rc<dyn Toolkit> = ctx.toolkit();
        let handle = self.handle;
        match next {
            Some(widget) => {
                let existing = self.child.clone();
                let node = ctx.update_node_if_necessary(existing.as_ref(), widget, |node| {
                    if let Some(old) = &existing {
                        let old = old.borrow().handle();
                        toolkit.detach_child(handle, old);
                        toolkit.destroy(old);
                    }
                    toolkit.attach_child(handle, node.borrow().handle(), Placement::Content);
                })?;
                self.child = Some(node);
            }
            None => {
                if let Some(old) = self.child.take() {
                    let old = old.borrow().handle();
                    toolkit.detach_child(handle, old);
                    toolkit.destroy(old);
                }
            }
        }
        Ok(())
    }
}

impl RenderNode for WindowNode {
    fn handle(&self) -> NativeHandle {
        self.handle
    }

    fn apply_changes(
        &mut self,
        ctx: &BuildContext,
        widget: &Rc<dyn RenderWidget>,
    ) -> Result<NodeUpdate> {
        let Some(next) = downcast_widget::<Window>(widget) else {
            return replace_with(ctx, widget);
        };
        let title = next.effective_title(ctx);
        if title != self.title {
            ctx.toolkit()
                .set_property(self.handle, "title", title.as_str().into());
            self.title = title;
        }
        self.sync_child(ctx, next.child.as_ref())?;
        self.widget = next;
        Ok(NodeUpdate::KeepSelf)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
