//! [`KeyedWidget`]: a widget compared and hashed by its key.

use std::fmt;
use std::hash::{Hash, Hasher};

use super::traits::Widget;
use crate::identity::Key;

/// Stores heterogeneous widgets in sets and maps, using the widget's key as its identity.
#[derive(Clone)]
pub struct KeyedWidget {
    key: Key,
    widget: Widget,
}

impl KeyedWidget {
    /// Capture the widget together with its current key.
    pub fn new(widget: Widget) -> Self {
        Self {
            key: widget.key(),
            widget,
        }
    }

    /// The captured key.
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// The wrapped widget.
    pub fn widget(&self) -> &Widget {
        &self.widget
    }

    /// Unwrap.
    pub fn into_inner(self) -> Widget {
        self.widget
    }
}

impl PartialEq for KeyedWidget {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for KeyedWidget {}

impl Hash for KeyedWidget {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl From<Widget> for KeyedWidget {
    fn from(widget: Widget) -> Self {
        KeyedWidget::new(widget)
    }
}

impl fmt::Debug for KeyedWidget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedWidget")
            .field("key", &self.key)
            .field("widget", &self.widget)
            .finish()
    }
}
