//! Grid widget: children placed on a cell grid.
//!
//! Placement follows [`place_items`]. Children are diffed per slot index; a slot whose
//! node was replaced has its old native child detached and destroyed before the new one
//! is attached, so two children never occupy the same cell at once.

use std::any::Any;
use std::collections::HashSet;
use std::rc::Rc;

use crate::engine::BuildContext;
use crate::error::{ReconcileError, Result};
use crate::geometry::Size;
use crate::identity::Key;
use crate::layout::{place_items, GridPlacement, Hint, ItemGeometry, Origin};
use crate::render::{downcast_widget, new_node, replace_with, NodeRef, NodeUpdate, RenderNode};
use crate::toolkit::{NativeHandle, NativeKind, Placement};
use crate::widget::{KeyedWidget, RenderWidget, Widget};

// ---------------------------------------------------------------------------
// GridItem
// ---------------------------------------------------------------------------

/// One child with its geometry.
#[derive(Debug, Clone)]
pub struct GridItem {
    child: Widget,
    geometry: ItemGeometry,
}

impl GridItem {
    /// A 1x1 item placed by hint.
    pub fn new(child: impl Into<Widget>) -> Self {
        Self {
            child: child.into(),
            geometry: ItemGeometry::new(),
        }
    }

    /// Set an explicit origin (builder).
    pub fn at(mut self, origin: Origin) -> Self {
        self.geometry = self.geometry.at(origin);
        self
    }

    /// Set the size in cells (builder).
    pub fn size(mut self, width: i32, height: i32) -> Self {
        self.geometry = self.geometry.size(Size::new(width, height));
        self
    }

    /// Set the positional hint (builder).
    pub fn hint(mut self, hint: Hint) -> Self {
        self.geometry = self.geometry.hint(hint);
        self
    }

    /// The child description.
    pub fn child(&self) -> &Widget {
        &self.child
    }

    /// Origin, size and hint.
    pub fn geometry(&self) -> ItemGeometry {
        self.geometry
    }
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// A container placing its items on a grid of cells.
///
/// # Examples
///
/// ```ignore
/// let form = Grid::new()
///     .default_hint(Hint::Below)
///     .item(GridItem::new(Label::new("Name")).at(Origin::Absolute(Offset::ORIGIN)))
///     .child(TextInput::new());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Grid {
    key: Key,
    default_hint: Hint,
    items: Vec<GridItem>,
}

impl Grid {
    /// An empty grid with no default hint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the key (builder).
    pub fn with_key(mut self, key: Key) -> Self {
        self.key = key;
        self
    }

    /// Set the hint used by items that leave theirs unspecified (builder).
    pub fn default_hint(mut self, hint: Hint) -> Self {
        self.default_hint = hint;
        self
    }

    /// Append an item (builder).
    pub fn item(mut self, item: GridItem) -> Self {
        self.items.push(item);
        self
    }

    /// Append a 1x1 child placed by the default hint (builder).
    pub fn child(self, child: impl Into<Widget>) -> Self {
        self.item(GridItem::new(child))
    }

    /// The items, in placement order.
    pub fn items(&self) -> &[GridItem] {
        &self.items
    }

    /// Reject sibling sets where two children share a non-null key.
    fn check_unique_keys(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for item in &self.items {
            let keyed = KeyedWidget::new(item.child.clone());
            if keyed.key().is_null() {
                continue;
            }
            let key = keyed.key().to_string();
            if !seen.insert(keyed) {
                return Err(ReconcileError::DuplicateKey { key });
            }
        }
        Ok(())
    }

    fn placements(&self) -> Result<Vec<GridPlacement>> {
        self.check_unique_keys()?;
        place_items(self.items.iter().map(GridItem::geometry), self.default_hint)
    }
}

impl RenderWidget for Grid {
    fn key(&self) -> Key {
        self.key.clone()
    }

    fn name(&self) -> &'static str {
        "Grid"
    }

    fn create_node(self: Rc<Self>, ctx: &BuildContext) -> Result<NodeRef> {
        let handle = ctx.toolkit().create(NativeKind::Grid, &[]);
        let mut node = GridNode {
            handle,
            widget: Rc::clone(&self),
            slots: Vec::new(),
        };
        if let Err(err) = node.sync_items(ctx, &self) {
            node.release(ctx);
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

impl From<Grid> for Widget {
    fn from(grid: Grid) -> Self {
        Widget::render(grid)
    }
}

// ---------------------------------------------------------------------------
// GridNode
// ---------------------------------------------------------------------------

struct Slot {
    node: NodeRef,
    placement: GridPlacement,
}

fn cell(placement: GridPlacement) -> Placement {
    Placement::Cell {
        origin: placement.origin,
        size: placement.size,
    }
}

/// Live counterpart of [`Grid`].
pub struct GridNode {
    handle: NativeHandle,
    widget: Rc<Grid>,
    slots: Vec<Slot>,
}

impl GridNode {
    /// Child nodes, in slot order.
    pub fn children(&self) -> impl Iterator<Item = &NodeRef> {
        self.slots.iter().map(|slot| &slot.node)
    }

    /// Computed placements, in slot order.
    pub fn placements(&self) -> Vec<GridPlacement> {
        self.slots.iter().map(|slot| slot.placement).collect()
    }

    /// The description this node last applied.
    pub fn widget(&self) -> &Rc<Grid> {
        &self.widget
    }

    fn sync_items(&mut self, ctx: &BuildContext, grid: &Grid) -> Result<()> {
        let placements = grid.placements()?;
        let toolkit = ctx.toolkit();
        let handle = self.handle;

        for (index, (item, placement)) in grid.items.iter().zip(placements).enumerate() {
            let existing = self.slots.get(index).map(|slot| Rc::clone(&slot.node));
            let mut attached = false;
            let node = ctx.update_node_if_necessary(existing.as_ref(), &item.child, |node| {
                if let Some(old) = &existing {
                    let old = old.borrow().handle();
                    toolkit.detach_child(handle, old);
                    toolkit.destroy(old);
                }
                toolkit.attach_child(handle, node.borrow().handle(), cell(placement));
                attached = true;
            })?;

            match self.slots.get_mut(index) {
                Some(slot) => {
                    if !attached && slot.placement != placement {
                        let child = node.borrow().handle();
                        toolkit.detach_child(handle, child);
                        toolkit.attach_child(handle, child, cell(placement));
                    }
                    *slot = Slot { node, placement };
                }
                None => self.slots.push(Slot { node, placement }),
            }
        }

        for surplus in self.slots.drain(grid.items.len().min(self.slots.len())..) {
            let child = surplus.node.borrow().handle();
            toolkit.detach_child(handle, child);
            toolkit.destroy(child);
        }
        Ok(())
    }

    /// Detach and destroy every child.
    fn release(&mut self, ctx: &BuildContext) {
        let toolkit = ctx.toolkit();
        for slot in self.slots.drain(..) {
            let child = slot.node.borrow().handle();
            toolkit.detach_child(self.handle, child);
            toolkit.destroy(child);
        }
    }
}

impl RenderNode for GridNode {
    fn handle(&self) -> NativeHandle {
        self.handle
    }

    fn apply_changes(
        &mut self,
        ctx: &BuildContext,
        widget: &Rc<dyn RenderWidget>,
    ) -> Result<NodeUpdate> {
        let Some(next) = downcast_widget::<Grid>(widget) else {
            return replace_with(ctx, widget);
        };
        self.sync_items(ctx, &next)?;
        self.widget = next;
        Ok(NodeUpdate::KeepSelf)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
