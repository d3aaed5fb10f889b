//! Chat Backend Traits
//!
//! The widget talks to its chat endpoint through [`ChatBackend`], so tests
//! and alternative transports can stand in for the HTTP client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::SessionId;

/// Reply shown whenever an exchange fails, whatever the cause
pub const FALLBACK_REPLY: &str = "Something went wrong on our side. We’re looking into it, and things should be back to normal soon. Thanks for your patience.";

/// Body of a chat request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Raw text as typed
    pub message: String,
    /// Session identifier
    pub chatid: String,
}

impl ChatRequest {
    /// Build a request for `message` in session `chat_id`
    pub fn new(message: impl Into<String>, chat_id: &SessionId) -> Self {
        Self {
            message: message.into(),
            chatid: chat_id.as_str().to_string(),
        }
    }
}

/// Body of a successful chat response
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Assistant text
    pub reply: String,
}

/// Ways a single exchange can fail
///
/// None of these reach the visitor; every variant ends in [`FALLBACK_REPLY`].
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// The request could not be sent or the connection dropped
    #[error("Chat request failed: {0}")]
    Transport(String),

    /// The endpoint answered with a non-success status
    #[error("Chat endpoint returned HTTP {0}")]
    Status(u16),

    /// The body was not `{ "reply": string }`
    #[error("Malformed chat response: {0}")]
    Malformed(String),
}

impl ExchangeError {
    /// Text to append to the transcript for this failure
    #[must_use]
    pub fn user_facing(&self) -> &'static str {
        FALLBACK_REPLY
    }
}

/// Remote chat endpoint
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &str;

    /// Send one message and wait for the reply
    ///
    /// Called at most once per accepted submission; never retried.
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, ExchangeError>;
}
