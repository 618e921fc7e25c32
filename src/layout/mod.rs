//! Layout: grid coordinate placement.

pub mod grid;

pub use grid::{place_items, GridPlacement, Hint, ItemGeometry, Origin};
