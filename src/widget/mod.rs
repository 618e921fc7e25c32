//! Widget model: the closed [`Widget`] sum type and the traits behind each variant.

pub mod keyed;
pub mod traits;

pub use keyed::KeyedWidget;
pub use traits::{
    AnyStatefulWidget, Builder, RenderWidget, StatefulWidget, StatelessWidget, Widget,
};
