//! Signal identity: typed event channels, identity-compared handlers, connection groups.
//!
//! - [`SignalId`]: a declared event channel (e.g. "clicked"), compared by identity.
//! - [`Handler`]: a callback wrapper compared by identity, never by closure contents.
//! - [`UnboundHandler`]: a method-like handler that binds to a creator; every binding to
//!   the same creator compares equal, so rebuilding a widget tree does not look like a
//!   handler change.
//! - [`SignalConnectionGroup`]: ordered (signal, handler) pairs with dispatch and a
//!   structural hash for diffing.

pub mod connection;
pub mod handler;
pub mod id;

pub use connection::{hash_combine, SignalConnection, SignalConnectionGroup};
pub use handler::{Creator, Handler, HandlerIdentity, Propagation, UnboundHandler};
pub use id::{ErasedSignal, SignalId};
