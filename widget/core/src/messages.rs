//! Widget Messages
//!
//! Messages sent from the chat widget core to the rendering surface. The
//! surface keeps no business logic of its own: it applies these messages to
//! its display state and draws whatever view they describe.

use serde::{Deserialize, Serialize};

use crate::lifecycle::{WidgetState, WidgetView};
use crate::session::SessionId;

/// Who authored a transcript entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Typed by the visitor
    User,
    /// Returned by the chat endpoint (or the fallback apology)
    Assistant,
}

impl Origin {
    /// Label shown in front of the message text
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Origin::User => "You",
            Origin::Assistant => "Assistant",
        }
    }
}

/// A single transcript entry
///
/// Fields are private so an entry cannot change after it is appended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    origin: Origin,
    text: String,
}

impl Message {
    /// Create a message from the visitor
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            origin: Origin::User,
            text: text.into(),
        }
    }

    /// Create a message from the assistant
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            origin: Origin::Assistant,
            text: text.into(),
        }
    }

    /// Who wrote it
    #[must_use]
    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// The message text, exactly as appended
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Messages from the widget core to the surface
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum WidgetMessage {
    // ============================================
    // Lifecycle
    // ============================================
    /// The widget entered a new lifecycle state
    State {
        /// New state
        state: WidgetState,
        /// View the surface should render for it
        view: WidgetView,
    },

    // ============================================
    // Transcript
    // ============================================
    /// A message was appended to the transcript
    Appended {
        /// Position of the message in the transcript
        index: usize,
        /// The appended message
        message: Message,
    },

    /// Pin the transcript view to its newest entry
    ScrollToBottom,

    /// An exchange started or settled
    AwaitingResponse {
        /// Whether a reply is pending
        waiting: bool,
    },

    // ============================================
    // Input
    // ============================================
    /// The input field was cleared after an exchange settled
    InputCleared,

    // ============================================
    // Session
    // ============================================
    /// The session identifier finished resolving
    SessionReady {
        /// Identifier used for every chat request from now on
        session_id: SessionId,
    },
}
