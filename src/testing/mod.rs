//! Headless testing framework: an in-memory toolkit, a manual run loop, and the Pilot.
//!
//! Use the [`Pilot`] to drive an [`App`](crate::app::App) without a native toolkit, or
//! [`context`] to get a bare [`BuildContext`] for exercising nodes directly.

pub mod headless;
pub mod pilot;
pub mod run_loop;

use std::rc::Rc;

pub use headless::{HeadlessToolkit, ToolkitCall};
pub use pilot::Pilot;
pub use run_loop::ManualRunLoop;

use crate::app::AppConfig;
use crate::engine::BuildContext;
use crate::widget::Widget;

/// A headless engine for `root` with the default config. No pass has run.
///
/// # Panics
///
/// Never with the default config; see [`context_with`].
pub fn context(root: impl Into<Widget>) -> (BuildContext, Rc<HeadlessToolkit>, Rc<ManualRunLoop>) {
    context_with(&AppConfig::default(), root)
}

/// A headless engine for `root` with `config`. No pass has run.
///
/// # Panics
///
/// Panics if `config` is invalid.
pub fn context_with(
    config: &AppConfig,
    root: impl Into<Widget>,
) -> (BuildContext, Rc<HeadlessToolkit>, Rc<ManualRunLoop>) {
    let toolkit = Rc::new(HeadlessToolkit::new());
    let run_loop = Rc::new(ManualRunLoop::new());
    let ctx = BuildContext::new(config, toolkit.clone(), run_loop.clone(), root.into())
        .unwrap_or_else(|err| panic!("invalid test config: {err}"));
    (ctx, toolkit, run_loop)
}
