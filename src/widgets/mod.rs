//! Built-in widgets: Window, Label, TextInput, Button, Grid.
//!
//! Each is a [`RenderWidget`](crate::widget::RenderWidget) paired with the node type that
//! keeps its native object in sync.

pub mod button;
pub mod grid;
pub mod label;
pub mod text_input;
pub mod window;

pub use button::{Button, ButtonNode, Clicked, CLICKED};
pub use grid::{Grid, GridItem, GridNode};
pub use label::{Label, LabelNode};
pub use text_input::{TextInput, TextInputNode, ACTIVATED, CHANGED};
pub use window::{Window, WindowNode};
