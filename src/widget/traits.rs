//! Widget descriptions: stateless, stateful, and render-producing.
//!
//! A [`Widget`] is an immutable, cheaply cloned description of desired UI. The engine
//! expands stateless and stateful layers until it reaches a [`RenderWidget`], which knows
//! how to create or update a live [`RenderNode`](crate::render::RenderNode).
//!
//! Every method is object-safe so variants can be stored as `Rc<dyn ...>`.

use std::any::{Any, TypeId};
use std::fmt;
use std::rc::Rc;

use crate::engine::{BuildContext, StateHandle};
use crate::error::Result;
use crate::identity::Key;
use crate::render::NodeRef;

// ---------------------------------------------------------------------------
// StatelessWidget
// ---------------------------------------------------------------------------

/// A pure function from the current build context to another description.
pub trait StatelessWidget: 'static {
    /// Identity used to match this widget across rebuilds.
    fn key(&self) -> Key {
        Key::Null
    }

    /// Name used in diagnostics.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Produce the next description.
    fn build(&self, ctx: &BuildContext) -> Widget;
}

// ---------------------------------------------------------------------------
// StatefulWidget
// ---------------------------------------------------------------------------

/// A widget whose description depends on engine-owned state.
///
/// The engine keeps one `State` per key: it is created the first time the key appears in
/// a pass, handed back on every later pass where the key recurs, and dropped after a pass
/// in which the key did not appear.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// struct Counter;
///
/// impl StatefulWidget for Counter {
///     type State = u32;
///     fn key(&self) -> Key { Key::auto(self) }
///     fn create_state(&self) -> u32 { 0 }
///     fn build(&self, state: &StateHandle<u32>, _ctx: &BuildContext) -> Widget {
///         Label::new(format!("{}", state.get())).into()
///     }
/// }
/// ```
pub trait StatefulWidget: 'static {
    /// The state type owned by the engine on this widget's behalf.
    type State: 'static;

    /// Identity of the state slot. Stateful widgets sharing a pass must not share a key.
    fn key(&self) -> Key;

    /// Initial state, called when the key is new.
    fn create_state(&self) -> Self::State;

    /// Describe the UI for the current state.
    fn build(&self, state: &StateHandle<Self::State>, ctx: &BuildContext) -> Widget;

    /// Name used in diagnostics.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Type-erased [`StatefulWidget`], implemented for every stateful widget.
///
/// State crosses this boundary as `Rc<dyn Any>`; the state type is carried alongside as a
/// `TypeId` tag and checked before any downcast.
pub trait AnyStatefulWidget {
    fn key(&self) -> Key;
    fn name(&self) -> &'static str;
    fn state_type(&self) -> TypeId;
    fn create_state(&self, ctx: &BuildContext) -> Rc<dyn Any>;
    /// Build with an erased state of type [`state_type`](Self::state_type).
    fn build_erased(&self, state: &Rc<dyn Any>, ctx: &BuildContext) -> Widget;
}

impl<W: StatefulWidget> AnyStatefulWidget for W {
    fn key(&self) -> Key {
        StatefulWidget::key(self)
    }

    fn name(&self) -> &'static str {
        StatefulWidget::name(self)
    }

    fn state_type(&self) -> TypeId {
        TypeId::of::<W::State>()
    }

    fn create_state(&self, ctx: &BuildContext) -> Rc<dyn Any> {
        StateHandle::new(StatefulWidget::create_state(self), ctx).erase()
    }

    fn build_erased(&self, state: &Rc<dyn Any>, ctx: &BuildContext) -> Widget {
        let handle = StateHandle::<W::State>::from_erased(state)
            .expect("state type tag checked before build_erased");
        StatefulWidget::build(self, &handle, ctx)
    }
}

// ---------------------------------------------------------------------------
// RenderWidget
// ---------------------------------------------------------------------------

/// A leaf description that creates and updates a live node.
pub trait RenderWidget: Any + fmt::Debug {
    /// Identity used to match this widget across rebuilds.
    fn key(&self) -> Key {
        Key::Null
    }

    /// Name used in diagnostics (e.g. "Label").
    fn name(&self) -> &'static str;

    /// Allocate a fresh node (and its native resource) for this description.
    fn create_node(self: Rc<Self>, ctx: &BuildContext) -> Result<NodeRef>;

    /// Upcast for type inspection.
    fn as_any(&self) -> &dyn Any;

    /// Upcast an owning pointer for downcasting.
    fn into_any(self: Rc<Self>) -> Rc<dyn Any>;
}

// ---------------------------------------------------------------------------
// Widget
// ---------------------------------------------------------------------------

/// A widget description: one of three capability variants.
#[derive(Clone)]
pub enum Widget {
    Stateless(Rc<dyn StatelessWidget>),
    Stateful(Rc<dyn AnyStatefulWidget>),
    Render(Rc<dyn RenderWidget>),
}

impl Widget {
    /// Wrap a stateless widget.
    pub fn stateless(widget: impl StatelessWidget) -> Self {
        Widget::Stateless(Rc::new(widget))
    }

    /// Wrap a stateful widget.
    pub fn stateful(widget: impl StatefulWidget) -> Self {
        Widget::Stateful(Rc::new(widget))
    }

    /// Wrap a render widget.
    pub fn render(widget: impl RenderWidget) -> Self {
        Widget::Render(Rc::new(widget))
    }

    /// The widget's key.
    pub fn key(&self) -> Key {
        match self {
            Widget::Stateless(w) => w.key(),
            Widget::Stateful(w) => w.key(),
            Widget::Render(w) => w.key(),
        }
    }

    /// The widget's diagnostic name.
    pub fn name(&self) -> &'static str {
        match self {
            Widget::Stateless(w) => w.name(),
            Widget::Stateful(w) => w.name(),
            Widget::Render(w) => w.name(),
        }
    }
}

impl fmt::Debug for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Widget::Stateless(w) => write!(f, "Stateless({})", w.name()),
            Widget::Stateful(w) => write!(f, "Stateful({})", w.name()),
            Widget::Render(w) => write!(f, "Render({w:?})"),
        }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// A stateless widget backed by a closure.
pub struct Builder {
    key: Key,
    build: Box<dyn Fn(&BuildContext) -> Widget>,
}

impl Builder {
    /// Create a builder from a closure.
    pub fn new(build: impl Fn(&BuildContext) -> Widget + 'static) -> Self {
        Self {
            key: Key::Null,
            build: Box::new(build),
        }
    }

    /// Set the key (builder).
    pub fn with_key(mut self, key: Key) -> Self {
        self.key = key;
        self
    }
}

impl StatelessWidget for Builder {
    fn key(&self) -> Key {
        self.key.clone()
    }

    fn name(&self) -> &'static str {
        "Builder"
    }

    fn build(&self, ctx: &BuildContext) -> Widget {
        (self.build)(ctx)
    }
}

impl From<Builder> for Widget {
    fn from(builder: Builder) -> Self {
        Widget::stateless(builder)
    }
}
