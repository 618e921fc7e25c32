//! # arbor
//!
//! Incremental reconciliation of declarative widget trees against live native UI objects.
//!
//! An application describes its interface as a tree of immutable [`Widget`] values. The
//! engine expands that tree to leaf render descriptions, diffs each against the live node
//! that rendered the previous description, and touches the native toolkit only where
//! something changed. Stateful widgets keep their state across rebuilds by [`Key`], and
//! event handlers with stable identities are never rebound.
//!
//! ## Core Systems
//!
//! - **[`identity`]**: `Identity` tokens and widget `Key`s
//! - **[`signal`]**: signal ids, identity-compared handlers, connection groups
//! - **[`widget`]**: the `Widget` sum type and the stateless/stateful/render traits
//! - **[`render`]**: render nodes and the in-place-or-replace diff protocol
//! - **[`engine`]**: `BuildContext` (expansion, state generations, coalesced rebuilds)
//! - **[`layout`]**: grid cell placement
//! - **[`toolkit`]**: the native toolkit and run loop boundary
//! - **[`widgets`]**: built-in widgets: Window, Label, TextInput, Button, Grid
//! - **[`app`]**: configuration and bootstrap
//! - **[`testing`]**: headless toolkit, manual run loop, and the Pilot
//! - **[`geometry`]**: Offset and Size cell primitives

// Foundation
pub mod error;
pub mod geometry;
pub mod identity;

// Core systems
pub mod engine;
pub mod layout;
pub mod render;
pub mod signal;

// Widget system
pub mod widget;
pub mod widgets;

// Host boundary
pub mod toolkit;

// Application
pub mod app;
pub mod testing;

pub use app::{App, AppConfig};
pub use engine::{BuildContext, StateHandle};
pub use error::{ReconcileError, Result};
pub use identity::{Identity, Key};
pub use signal::{Handler, Propagation, SignalId, UnboundHandler};
pub use widget::{Builder, RenderWidget, StatefulWidget, StatelessWidget, Widget};
