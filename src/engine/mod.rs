//! The reconciliation engine.
//!
//! - [`BuildContext`]: expands widgets, diffs nodes, owns state, schedules rebuilds.
//! - [`StateHandle`]: typed access to one engine-owned state.
//! - [`tables`]: the two-generation state arena behind state lifetime.

pub mod context;
pub mod state;
pub mod tables;

pub use context::BuildContext;
pub use state::StateHandle;
pub use tables::StateTables;
