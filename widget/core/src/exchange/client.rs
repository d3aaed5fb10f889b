//! Message Exchange Client
//!
//! Bookkeeping for one visitor input field: what is typed, whether a reply
//! is pending, and how a settled exchange turns into a transcript entry.
//! The widget performs the actual request; this type decides whether one may
//! start and what to append when it ends.

use crate::messages::Message;

use super::traits::{ChatReply, ExchangeError};

/// Input field plus in-flight flag
#[derive(Clone, Debug, Default)]
pub struct ExchangeClient {
    input: String,
    in_flight: bool,
}

impl ExchangeClient {
    /// Empty input, nothing pending
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current input text
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replace the input text
    ///
    /// Ignored while a reply is pending (the field is disabled).
    pub fn set_input(&mut self, text: impl Into<String>) -> bool {
        if self.in_flight {
            return false;
        }
        self.input = text.into();
        true
    }

    /// Whether a reply is pending
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Whether the send control is enabled
    #[must_use]
    pub fn can_send(&self) -> bool {
        !self.in_flight
    }

    /// Try to start an exchange with the current input
    ///
    /// Returns the literal text to send, or `None` when the input is blank or
    /// a reply is already pending. On success the in-flight flag is set.
    pub fn begin(&mut self) -> Option<String> {
        if self.in_flight || self.input.trim().is_empty() {
            return None;
        }
        self.in_flight = true;
        Some(self.input.clone())
    }

    /// Finish the pending exchange
    ///
    /// Clears the input and the in-flight flag whatever the outcome, and
    /// returns the assistant message to append.
    pub fn settle(&mut self, outcome: Result<ChatReply, ExchangeError>) -> Message {
        self.input.clear();
        self.in_flight = false;

        match outcome {
            Ok(reply) => Message::assistant(reply.reply),
            Err(e) => {
                tracing::warn!("Chat exchange failed: {}", e);
                Message::assistant(e.user_facing())
            }
        }
    }
}
