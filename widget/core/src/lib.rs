//! Chatbot Core - Headless Chat Widget for the Portfolio Site
//!
//! This crate holds the chat widget's behaviour without any UI framework:
//! session identity, the open/close lifecycle, and the message exchange with
//! the remote chat endpoint. A surface (the terminal UI, a test harness, or
//! anything else) sends [`SurfaceEvent`]s up and renders the
//! [`WidgetMessage`]s that come back down.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                       Surfaces                            │
//! │        ┌─────────┐            ┌──────────────────┐        │
//! │        │   TUI   │            │ Headless / tests │        │
//! │        └────┬────┘            └────────┬─────────┘        │
//! │             └──────────────┬───────────┘                  │
//! │                   SurfaceEvent (up)                       │
//! │                  WidgetMessage (down)                     │
//! └────────────────────────────┼──────────────────────────────┘
//!                              │
//! ┌────────────────────────────┼──────────────────────────────┐
//! │                      CHATBOT CORE                         │
//! │  ┌─────────────────────────┴───────────────────────────┐  │
//! │  │                     ChatWidget                      │  │
//! │  │  ┌───────────┐  ┌───────────┐  ┌─────────────────┐  │  │
//! │  │  │ Lifecycle │  │  Session  │  │    Exchange     │  │  │
//! │  │  │  (timer)  │  │ Identity  │  │ (ChatBackend)   │  │  │
//! │  │  └───────────┘  └───────────┘  └─────────────────┘  │  │
//! │  └─────────────────────────────────────────────────────┘  │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use chatbot_core::{load_config, ChatWidget, MemoryStore, SurfaceEvent};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config()?;
//!     let store = Arc::new(MemoryStore::new());
//!     let (tx, mut rx) = mpsc::channel(100);
//!
//!     let mut widget = ChatWidget::from_config(config, store, tx);
//!     widget.mount().await;
//!
//!     loop {
//!         while let Ok(msg) = rx.try_recv() {
//!             // Render message
//!         }
//!         widget.poll().await;
//!         // Forward user input as SurfaceEvent
//!     }
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`session`]: Durable per-install chat identifier
//! - [`lifecycle`]: Closed/Opening/Open/Closing state machine and its timer
//! - [`exchange`]: Chat request/response and the in-flight guard
//! - [`transcript`]: Append-only conversation
//! - [`widget`]: [`ChatWidget`], tying the above together
//! - [`events`]: Events from surfaces to the widget
//! - [`messages`]: Messages from the widget to surfaces
//! - [`content`]: Blog and pinned-repository lists shown behind the widget
//! - [`config`]: Layered configuration
//!
//! # No TUI Dependencies
//!
//! Nothing here depends on ratatui or crossterm.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod content;
pub mod events;
pub mod exchange;
pub mod lifecycle;
pub mod messages;
pub mod session;
pub mod transcript;
pub mod widget;

// Re-exports for convenience
pub use events::SurfaceEvent;
pub use exchange::{
    ChatBackend, ChatReply, ChatRequest, ExchangeClient, ExchangeError, HttpChatBackend,
    FALLBACK_REPLY,
};
pub use lifecycle::{
    AnimationPhase, AnimationTimer, Lifecycle, Transition, WidgetState, WidgetView,
    DEFAULT_ANIMATION,
};
pub use messages::{Message, Origin, WidgetMessage};
pub use session::{
    AddressLookup, FileStore, IpifyLookup, MemoryStore, SessionId, SessionIdentity,
    SessionStore, StaticLookup, StoreError, UNKNOWN_ADDRESS,
};
pub use transcript::Transcript;
pub use widget::ChatWidget;

// Content exports
pub use content::{prepare_blogs, BlogPost, ContentClient, ContentError, PageContent, Repository};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, ChatConfig, ConfigError,
    ConfigOverrides, ConfigSource, SessionConfig, WidgetConfig, WidgetToml,
};
