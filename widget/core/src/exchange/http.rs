//! HTTP Chat Backend
//!
//! `POST {base}/api/chat` with `{ "message", "chatid" }`, expecting
//! `{ "reply" }` back. Any non-2xx status or body that does not parse is a
//! failed exchange.

use std::time::Duration;

use async_trait::async_trait;

use super::traits::{ChatBackend, ChatReply, ChatRequest, ExchangeError};
use crate::config::ChatConfig;

/// reqwest-based chat backend
#[derive(Clone, Debug)]
pub struct HttpChatBackend {
    /// Base address, no trailing slash
    base_url: String,
    /// Optional transport timeout
    timeout: Option<Duration>,
    /// HTTP client
    http_client: reqwest::Client,
}

impl HttpChatBackend {
    /// Create a backend for `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Create a backend sharing an existing HTTP client
    pub fn with_client(base_url: impl Into<String>, http_client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: None,
            http_client,
        }
    }

    /// Create from the resolved chat configuration
    #[must_use]
    pub fn from_config(config: &ChatConfig) -> Self {
        let mut backend = Self::new(config.api_url.clone());
        backend.timeout = config.request_timeout;
        backend
    }

    /// Set a transport timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Get chat endpoint URL
    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    fn name(&self) -> &str {
        "HTTP"
    }

    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, ExchangeError> {
        let mut builder = self.http_client.post(self.chat_url()).json(request);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ExchangeError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExchangeError::Status(status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ExchangeError::Transport(e.to_string()))?;

        serde_json::from_slice::<ChatReply>(&bytes).map_err(|e| ExchangeError::Malformed(e.to_string()))
    }
}
