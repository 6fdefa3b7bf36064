//! The UI component a request acts on behalf of.

use serde::{Deserialize, Serialize};

/// Busy overlay shown while a request is in flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockOptions {
    /// Show a spinner in the overlay.
    pub spinner: bool,
    /// Text shown in the overlay.
    pub msg: String,
}

impl LockOptions {
    /// A spinner overlay with `msg`.
    #[must_use]
    pub fn spinner(msg: impl Into<String>) -> Self {
        Self {
            spinner: true,
            msg: msg.into(),
        }
    }
}

/// Capabilities of a widget (grid, form, sidebar) that initiated a request.
///
/// The lock is a visual interaction guard, not mutual exclusion: nothing stops
/// two requests from locking the same owner concurrently.
pub trait Owner: Send + Sync {
    /// Show the busy overlay.
    fn lock(&self, options: &LockOptions);

    /// Hide the busy overlay.
    fn unlock(&self);

    /// Reload the widget's data from its source.
    fn reload(&self);

    /// Show a message to the user.
    fn message(&self, text: &str);
}
