//! Error taxonomy for the reconciliation engine.
//!
//! Every variant except [`ReconcileError::InvalidConfig`] describes a defect in the
//! widget/state graph rather than a transient failure, so nothing in the crate retries.
//! Diff mismatches are not errors: a node asked to update from a foreign widget type
//! simply builds a replacement.

/// Errors raised while expanding, diffing, or placing widgets.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileError {
    /// Expansion did not reach a render-producing widget within the iteration bound.
    #[error("expansion of {widget} did not reach a render widget after {iterations} iterations (build cycle?)")]
    ExpansionCycle { widget: String, iterations: usize },

    /// The root widget expanded to something other than a window.
    #[error("root widget must expand to a Window, found {found}")]
    RootNotWindow { found: String },

    /// A grid item has no origin and neither it nor the grid specifies a hint.
    #[error("grid item {index} has no origin and no placement hint (grid default is unspecified)")]
    NoPlacement { index: usize },

    /// Two widgets claimed the same identity where identities must be unique.
    #[error("duplicate widget key {key}")]
    DuplicateKey { key: String },

    /// State mutation was requested while a build pass was running.
    #[error("state mutation requested during a build pass; defer it until the pass completes")]
    MutationDuringBuild,

    /// Engine configuration rejected at startup.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, ReconcileError>;
