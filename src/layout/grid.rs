//! Sequential grid placement.
//!
//! Items are placed in order. Each item's absolute origin comes from, in priority:
//!
//! 1. its explicit origin: absolute as-is, relative added to the previous item's origin;
//! 2. its hint, or the grid's default hint when the item's is unspecified, offsetting the
//!    previous origin by the previous item's size along that direction.
//!
//! The running "previous origin" and "previous size" start at (0,0) and zero size, so
//! reordering items moves every item placed relative to them.

use crate::error::{ReconcileError, Result};
use crate::geometry::{Offset, Size};

/// An explicit item origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Cell coordinates within the grid.
    Absolute(Offset),
    /// Displacement from the previous item's origin.
    Relative(Offset),
}

/// Where to put an item without an origin, relative to the previous item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Hint {
    #[default]
    Unspecified,
    Above,
    Below,
    Left,
    Right,
}

/// What placement needs to know about one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemGeometry {
    pub origin: Option<Origin>,
    pub size: Size,
    pub hint: Hint,
}

impl ItemGeometry {
    /// A 1x1 item with no origin and no hint.
    pub fn new() -> Self {
        Self {
            origin: None,
            size: Size::ONE,
            hint: Hint::Unspecified,
        }
    }

    /// Set the origin (builder).
    pub fn at(mut self, origin: Origin) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Set the size (builder).
    pub fn size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    /// Set the hint (builder).
    pub fn hint(mut self, hint: Hint) -> Self {
        self.hint = hint;
        self
    }
}

impl Default for ItemGeometry {
    fn default() -> Self {
        Self::new()
    }
}

/// The absolute cells one item occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridPlacement {
    pub origin: Offset,
    pub size: Size,
}

/// Offset `previous` by `previous_size` in the direction `hint` points.
fn offset_by_hint(hint: Hint, previous: Offset, previous_size: Size) -> Option<Offset> {
    let Offset { x, y } = previous;
    match hint {
        Hint::Above => Some(Offset::new(x, y.saturating_sub(previous_size.height))),
        Hint::Below => Some(Offset::new(x, y.saturating_add(previous_size.height))),
        Hint::Left => Some(Offset::new(x.saturating_sub(previous_size.width), y)),
        Hint::Right => Some(Offset::new(x.saturating_add(previous_size.width), y)),
        Hint::Unspecified => None,
    }
}

/// Compute absolute placements for `items`, in order.
///
/// Fails with [`ReconcileError::NoPlacement`] for the first item that has no origin while
/// both its hint and `default_hint` are unspecified.
pub fn place_items(
    items: impl IntoIterator<Item = ItemGeometry>,
    default_hint: Hint,
) -> Result<Vec<GridPlacement>> {
    let mut previous = Offset::ORIGIN;
    let mut previous_size = Size::ZERO;

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let origin = match item.origin {
                Some(Origin::Absolute(origin)) => origin,
                Some(Origin::Relative(delta)) => previous + delta,
                None => {
                    let hint = match item.hint {
                        Hint::Unspecified => default_hint,
                        hint => hint,
                    };
                    offset_by_hint(hint, previous, previous_size)
                        .ok_or(ReconcileError::NoPlacement { index })?
                }
            };
            previous = origin;
            previous_size = item.size;
            Ok(GridPlacement {
                origin,
                size: item.size,
            })
        })
        .collect()
}
