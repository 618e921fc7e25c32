//! Render nodes: the live counterparts of render widgets, and the diff protocol.

pub mod node;

pub use node::{apply, downcast_widget, new_node, replace_with, NodeRef, NodeUpdate, RenderNode};
