//! Pilot: programmatic interaction with a headless App.
//!
//! The `Pilot` wraps an [`App`] over a [`HeadlessToolkit`] and a [`ManualRunLoop`] and
//! provides methods to simulate user input, run pending rebuilds, and inspect the native
//! tree.

use std::rc::Rc;

use crate::app::{App, AppConfig};
use crate::error::Result;
use crate::toolkit::{NativeHandle, NativeKind, PropValue};
use crate::widget::Widget;

use super::{HeadlessToolkit, ManualRunLoop};

// ---------------------------------------------------------------------------
// Pilot
// ---------------------------------------------------------------------------

/// A headless app driver for testing.
///
/// Input simulation fires native signals synchronously, exactly as a toolkit would;
/// state mutations made by handlers only reach the native tree after
/// [`run_idle`](Pilot::run_idle).
///
/// # Examples
///
/// ```ignore
/// use arbor::testing::Pilot;
/// use arbor::toolkit::NativeKind;
///
/// let pilot = Pilot::new(Counter)?;
/// let button = pilot.first(NativeKind::Button).unwrap();
/// pilot.click(button);
/// pilot.run_idle();
/// ```
pub struct Pilot {
    app: App,
    toolkit: Rc<HeadlessToolkit>,
    run_loop: Rc<ManualRunLoop>,
}

impl Pilot {
    /// Start `root` with the default config.
    pub fn new(root: impl Into<Widget>) -> Result<Self> {
        Self::with_config(AppConfig::default(), root)
    }

    /// Start `root` with `config`.
    pub fn with_config(config: AppConfig, root: impl Into<Widget>) -> Result<Self> {
        let toolkit = Rc::new(HeadlessToolkit::new());
        let run_loop = Rc::new(ManualRunLoop::new());
        let app = App::new(config, root, toolkit.clone(), run_loop.clone())?;
        app.start()?;
        Ok(Self {
            app,
            toolkit,
            run_loop,
        })
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn toolkit(&self) -> &Rc<HeadlessToolkit> {
        &self.toolkit
    }

    pub fn run_loop(&self) -> &Rc<ManualRunLoop> {
        &self.run_loop
    }

    // ── Input simulation ─────────────────────────────────────────────

    /// Click a button. Returns how many native callbacks ran.
    pub fn click(&self, handle: NativeHandle) -> usize {
        self.toolkit.emit(handle, "clicked", PropValue::Bool(true))
    }

    /// Replace the text of an input as if the user typed it.
    pub fn type_text(&self, handle: NativeHandle, text: &str) -> usize {
        self.toolkit
            .set_native_property(handle, "text", PropValue::from(text));
        self.toolkit.emit(handle, "changed", PropValue::from(text))
    }

    /// Submit an input, as if the user pressed Enter.
    pub fn activate(&self, handle: NativeHandle) -> usize {
        self.toolkit.emit(handle, "activate", PropValue::Bool(true))
    }

    /// Run pending idle callbacks (scheduled rebuilds). Returns how many ran.
    pub fn run_idle(&self) -> usize {
        self.run_loop.run_idle()
    }

    // ── Inspection ───────────────────────────────────────────────────

    /// Objects of `kind` in the presented tree, depth-first.
    pub fn find_by_kind(&self, kind: NativeKind) -> Vec<NativeHandle> {
        self.toolkit.find_by_kind(kind)
    }

    /// The first object of `kind` in the presented tree.
    pub fn first(&self, kind: NativeKind) -> Option<NativeHandle> {
        self.find_by_kind(kind).into_iter().next()
    }

    pub fn property(&self, handle: NativeHandle, name: &str) -> Option<PropValue> {
        self.toolkit.property(handle, name)
    }

    /// The presented tree as text.
    pub fn tree(&self) -> String {
        self.toolkit.render_tree()
    }
}
