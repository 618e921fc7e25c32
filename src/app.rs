//! App bootstrap: configuration plus the engine driving one root widget.
//!
//! [`App`] owns the [`BuildContext`] for a root widget on top of a toolkit and run loop.
//! Nothing is built until [`App::start`] runs the first pass; later passes are scheduled
//! by state mutations.

use std::rc::Rc;

use crate::engine::BuildContext;
use crate::error::{ReconcileError, Result};
use crate::toolkit::{NativeHandle, RunLoop, Toolkit};
use crate::widget::Widget;

/// Default bound on expansion steps per widget.
pub const DEFAULT_MAX_EXPANSION_ITERATIONS: usize = 500;

// ---------------------------------------------------------------------------
// AppConfig
// ---------------------------------------------------------------------------

/// Configuration for the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Reverse-DNS application identifier.
    pub application_id: String,
    /// Title for windows that do not set their own.
    pub title: Option<String>,
    /// How many stateless/stateful layers one widget may expand through before the
    /// expansion is treated as a cycle.
    pub max_expansion_iterations: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            application_id: "org.arbor.app".to_owned(),
            title: None,
            max_expansion_iterations: DEFAULT_MAX_EXPANSION_ITERATIONS,
        }
    }
}

impl AppConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the application identifier (builder).
    pub fn with_application_id(mut self, id: impl Into<String>) -> Self {
        self.application_id = id.into();
        self
    }

    /// Set the title (builder).
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the expansion bound (builder).
    pub fn with_max_expansion_iterations(mut self, iterations: usize) -> Self {
        self.max_expansion_iterations = iterations;
        self
    }

    /// Check the config before an engine is built from it.
    pub fn validate(&self) -> Result<()> {
        if self.application_id.trim().is_empty() {
            return Err(ReconcileError::InvalidConfig {
                reason: "application id is empty".to_owned(),
            });
        }
        if self.max_expansion_iterations == 0 {
            return Err(ReconcileError::InvalidConfig {
                reason: "max_expansion_iterations must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// An application: one root widget reconciled against a native toolkit.
///
/// # Examples
///
/// ```ignore
/// let app = App::new(
///     AppConfig::new().with_title("Counter"),
///     Counter,
///     toolkit,
///     Rc::new(TokioRunLoop::new()),
/// )?;
/// app.start()?;
/// ```
pub struct App {
    config: AppConfig,
    context: BuildContext,
}

impl App {
    /// Validate `config` and set up the engine. Does not build anything yet.
    pub fn new(
        config: AppConfig,
        root: impl Into<Widget>,
        toolkit: Rc<dyn Toolkit>,
        run_loop: Rc<dyn RunLoop>,
    ) -> Result<Self> {
        let context = BuildContext::new(&config, toolkit, run_loop, root.into())?;
        Ok(Self { config, context })
    }

    /// Run the first build pass, creating and presenting the native tree.
    pub fn start(&self) -> Result<()> {
        tracing::info!(
            application_id = %self.config.application_id,
            "starting application"
        );
        self.context.run_build_pass()
    }

    /// The engine handle.
    pub fn context(&self) -> &BuildContext {
        &self.context
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Native handle of the root window, once started.
    pub fn root_handle(&self) -> Option<NativeHandle> {
        self.context
            .root_node()
            .as_ref()
            .map(|node| node.borrow().handle())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{HeadlessToolkit, ManualRunLoop};
    use crate::toolkit::{NativeKind, PropValue};
    use crate::widgets::{Label, Window};
    use pretty_assertions::assert_eq;

    fn app(config: AppConfig, root: impl Into<Widget>) -> (Result<App>, Rc<HeadlessToolkit>) {
        let toolkit = Rc::new(HeadlessToolkit::new());
        let app = App::new(config, root, toolkit.clone(), Rc::new(ManualRunLoop::new()));
        (app, toolkit)
    }

    #[test]
    fn default_config() {
        let config = AppConfig::default();
        assert_eq!(config.application_id, "org.arbor.app");
        assert_eq!(config.title, None);
        assert_eq!(config.max_expansion_iterations, 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_sets_fields() {
        let config = AppConfig::new()
            .with_application_id("com.example.notes")
            .with_title("Notes")
            .with_max_expansion_iterations(8);
        assert_eq!(config.application_id, "com.example.notes");
        assert_eq!(config.title.as_deref(), Some("Notes"));
        assert_eq!(config.max_expansion_iterations, 8);
    }

    #[test]
    fn zero_iterations_is_invalid() {
        let (app, _) = app(
            AppConfig::new().with_max_expansion_iterations(0),
            Window::new(),
        );
        assert!(matches!(app.err(), Some(ReconcileError::InvalidConfig { .. })));
    }

    #[test]
    fn empty_application_id_is_invalid() {
        let config = AppConfig::new().with_application_id("  ");
        assert!(matches!(
            config.validate(),
            Err(ReconcileError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn nothing_built_before_start() {
        let (app, toolkit) = app(AppConfig::new(), Window::new());
        let app = app.unwrap();
        assert!(toolkit.is_empty());
        assert_eq!(app.root_handle(), None);
        assert_eq!(app.context().pass_count(), 0);
    }

    #[test]
    fn start_presents_root_window() {
        let (app, toolkit) = app(
            AppConfig::new().with_title("Hello"),
            Window::new().child(Label::new("world")),
        );
        let app = app.unwrap();
        app.start().unwrap();

        let root = app.root_handle().unwrap();
        assert_eq!(toolkit.root(), Some(root));
        assert_eq!(toolkit.kind(root), Some(NativeKind::Window));
        assert_eq!(toolkit.property(root, "title"), Some(PropValue::from("Hello")));
        assert_eq!(toolkit.find_by_kind(NativeKind::Label).len(), 1);
        assert_eq!(app.context().pass_count(), 1);
    }

    #[test]
    fn non_window_root_fails_to_start() {
        let (app, toolkit) = app(AppConfig::new(), Label::new("orphan"));
        let err = app.unwrap().start().unwrap_err();
        assert_eq!(
            err,
            ReconcileError::RootNotWindow {
                found: "Label".to_owned()
            }
        );
        assert_eq!(toolkit.root(), None);
    }
}
