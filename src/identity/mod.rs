//! Identity: stable tokens and widget keys.
//!
//! - [`Identity`]: an opaque token that compares equal only to itself.
//! - [`Key`]: the identity attached to every widget description, used to match
//!   widgets (and their state) across rebuilds.

pub mod key;
pub mod token;

pub use key::Key;
pub use token::Identity;
