//! The boundary with the native UI toolkit and the host run loop.
//!
//! The engine never draws anything itself. Render nodes allocate and mutate native
//! objects through [`Toolkit`]; the engine schedules rebuilds through [`RunLoop`].
//! [`HeadlessToolkit`](crate::testing::HeadlessToolkit) and
//! [`ManualRunLoop`](crate::testing::ManualRunLoop) implement both for tests;
//! [`TokioRunLoop`] schedules on a tokio `LocalSet`.

pub mod tokio_loop;

use std::fmt;
use std::rc::Rc;

use slotmap::new_key_type;

use crate::geometry::{Offset, Size};

pub use tokio_loop::TokioRunLoop;

new_key_type! {
    /// Handle to a native UI object. Copy, lightweight (u64).
    pub struct NativeHandle;
}

/// The kinds of native object the built-in widgets allocate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeKind {
    Window,
    Label,
    TextInput,
    Button,
    Grid,
}

impl fmt::Display for NativeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NativeKind::Window => "Window",
            NativeKind::Label => "Label",
            NativeKind::TextInput => "TextInput",
            NativeKind::Button => "Button",
            NativeKind::Grid => "Grid",
        };
        f.write_str(name)
    }
}

/// A native property value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropValue {
    Str(String),
    Bool(bool),
    Int(i64),
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Str(value.to_owned())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Str(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        PropValue::Int(value)
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Str(s) => write!(f, "{s:?}"),
            PropValue::Bool(b) => write!(f, "{b}"),
            PropValue::Int(i) => write!(f, "{i}"),
        }
    }
}

/// Where a child is attached inside its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placement {
    /// The parent's single content slot (e.g. a window's child).
    Content,
    /// A rectangle of grid cells.
    Cell { origin: Offset, size: Size },
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placement::Content => f.write_str("content"),
            Placement::Cell { origin, size } => write!(
                f,
                "({},{}) {}x{}",
                origin.x, origin.y, size.width, size.height
            ),
        }
    }
}

/// Callback the toolkit invokes when a native signal fires.
pub type NativeCallback = Rc<dyn Fn(&PropValue)>;

/// Native UI object management.
///
/// Methods take `&self`: implementations use interior mutability, because native signal
/// callbacks may re-enter the engine (and through it the toolkit) while a call is in
/// progress.
pub trait Toolkit {
    /// Allocate a native object with its initial properties.
    fn create(&self, kind: NativeKind, init: &[(&'static str, PropValue)]) -> NativeHandle;

    /// Mutate a live property.
    fn set_property(&self, handle: NativeHandle, name: &'static str, value: PropValue);

    /// Attach `child` inside `parent`.
    fn attach_child(&self, parent: NativeHandle, child: NativeHandle, placement: Placement);

    /// Detach `child` from `parent` without destroying it.
    fn detach_child(&self, parent: NativeHandle, child: NativeHandle);

    /// Release a native object (and whatever native children it still holds).
    fn destroy(&self, handle: NativeHandle);

    /// Make `handle` the visible root.
    fn present_root(&self, handle: NativeHandle);

    /// Subscribe to a native event on `handle`.
    fn connect_signal(&self, handle: NativeHandle, signal: &'static str, callback: NativeCallback);
}

/// Identifies a scheduled idle callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdleToken(pub u64);

/// A callback run once when the host loop goes idle.
pub type IdleCallback = Box<dyn FnOnce()>;

/// Idle-priority scheduling on the host run loop.
pub trait RunLoop {
    /// Run `callback` once, after control returns to the loop.
    fn schedule_idle(&self, callback: IdleCallback) -> IdleToken;

    /// Drop a scheduled callback that has not run yet. Unknown tokens are ignored.
    fn cancel_idle(&self, token: IdleToken);
}
