//! The render-node diff protocol.
//!
//! A node owns exactly one native resource. Given a new description it either updates
//! that resource in place ([`NodeUpdate::KeepSelf`]) or, when the description is of a
//! different widget type, leaves itself untouched and hands back a fresh node built by
//! the incoming widget ([`NodeUpdate::NewNode`]).
//!
//! Node lifecycle: `absent -> live` on creation, `live -> live` on every compatible
//! update, `live -> replaced` when a parent swaps it out. A replaced node is never
//! revived.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::engine::BuildContext;
use crate::error::Result;
use crate::toolkit::NativeHandle;
use crate::widget::RenderWidget;

/// Shared, mutable pointer to a live node. Node identity is pointer identity.
pub type NodeRef = Rc<RefCell<dyn RenderNode>>;

/// Outcome of [`RenderNode::apply_changes`].
pub enum NodeUpdate {
    /// The node updated itself in place.
    KeepSelf,
    /// The node could not render the description; use this replacement instead.
    NewNode(NodeRef),
}

impl fmt::Debug for NodeUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeUpdate::KeepSelf => f.write_str("KeepSelf"),
            NodeUpdate::NewNode(node) => write!(f, "NewNode({:?})", node.borrow().handle()),
        }
    }
}

/// The live counterpart of one render widget type.
pub trait RenderNode: Any {
    /// The native resource this node owns.
    fn handle(&self) -> NativeHandle;

    /// Bring the native resource in line with `widget`.
    ///
    /// Implementations must not touch the native resource when `widget` is of a type
    /// they do not render; use [`replace_with`] for that case.
    fn apply_changes(
        &mut self,
        ctx: &BuildContext,
        widget: &Rc<dyn RenderWidget>,
    ) -> Result<NodeUpdate>;

    /// Upcast for type inspection.
    fn as_any(&self) -> &dyn Any;
}

/// Wrap a concrete node as a [`NodeRef`].
pub fn new_node<N: RenderNode>(node: N) -> NodeRef {
    Rc::new(RefCell::new(node))
}

/// Downcast a render widget to the concrete type `W`, keeping shared ownership.
pub fn downcast_widget<W: RenderWidget>(widget: &Rc<dyn RenderWidget>) -> Option<Rc<W>> {
    if widget.as_any().is::<W>() {
        Rc::clone(widget).into_any().downcast::<W>().ok()
    } else {
        None
    }
}

/// The mismatch path: let `widget` build its own node.
pub fn replace_with(ctx: &BuildContext, widget: &Rc<dyn RenderWidget>) -> Result<NodeUpdate> {
    tracing::trace!(widget = widget.name(), "node type mismatch, building replacement");
    Ok(NodeUpdate::NewNode(Rc::clone(widget).create_node(ctx)?))
}

/// Apply `widget` to `node` and return the node to use from now on: `node` itself or
/// its replacement.
pub fn apply(node: &NodeRef, ctx: &BuildContext, widget: &Rc<dyn RenderWidget>) -> Result<NodeRef> {
    let update = node.borrow_mut().apply_changes(ctx, widget)?;
    Ok(match update {
        NodeUpdate::KeepSelf => Rc::clone(node),
        NodeUpdate::NewNode(replacement) => replacement,
    })
}
