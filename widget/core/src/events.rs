//! Surface Events
//!
//! Events sent from the rendering surface to the widget core. Surfaces report
//! what the visitor did; the widget decides whether the action is allowed in
//! the current lifecycle state.

use serde::{Deserialize, Serialize};

/// Events from the surface to the widget
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceEvent {
    /// The chat icon was clicked
    IconClicked,

    /// The close control on the open panel was clicked
    CloseClicked,

    /// The input field now holds this text
    InputChanged {
        /// Full field contents
        text: String,
    },

    /// The send control was pressed (or the form submitted)
    Submit,
}

impl SurfaceEvent {
    /// Shorthand for an input update
    pub fn input(text: impl Into<String>) -> Self {
        SurfaceEvent::InputChanged { text: text.into() }
    }
}
