//! Chat Message Exchange
//!
//! Sends visitor text to the remote chat endpoint and turns the outcome into
//! a transcript entry. Failures never surface as errors: they become the
//! fixed [`FALLBACK_REPLY`].
//!
//! # Usage
//!
//! ```ignore
//! use chatbot_core::exchange::{ChatBackend, ChatRequest, HttpChatBackend};
//!
//! let backend = HttpChatBackend::new("https://api.example.dev");
//! let reply = backend.send(&ChatRequest::new("Hello", &session_id)).await?;
//! ```

mod client;
mod http;
mod traits;

pub use client::ExchangeClient;
pub use http::HttpChatBackend;
pub use traits::{ChatBackend, ChatReply, ChatRequest, ExchangeError, FALLBACK_REPLY};
