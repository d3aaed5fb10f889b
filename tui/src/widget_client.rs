//! Widget Client
//!
//! Thin wrapper around the chat widget for TUI integration.
//! The widget is embedded directly (no network between surface and core).
//!
//! # Architecture
//!
//! The TUI is a "thin client" - it doesn't contain any business logic.
//! All lifecycle and exchange rules live in `chatbot-core`. The TUI's job is:
//! 1. Convert terminal events to SurfaceEvents
//! 2. Send SurfaceEvents to the widget
//! 3. Receive WidgetMessages
//! 4. Render display state based on messages

use std::sync::Arc;

use tokio::sync::mpsc;

use chatbot_core::{
    ChatWidget, FileStore, HttpChatBackend, MemoryStore, SessionStore, SurfaceEvent,
    WidgetConfig, WidgetMessage,
};

/// Client for communicating with the embedded widget
pub struct WidgetClient {
    /// The embedded widget
    widget: ChatWidget<HttpChatBackend>,
    /// Receiver for messages from the widget
    rx: mpsc::Receiver<WidgetMessage>,
}

impl WidgetClient {
    /// Create a client over an HTTP-backed widget
    ///
    /// With `ephemeral` set the session identifier lives only in memory.
    pub fn new(config: WidgetConfig, ephemeral: bool) -> Self {
        let (tx, rx) = mpsc::channel(100);
        let store = session_store(&config, ephemeral);
        let widget = ChatWidget::from_config(config, store, tx);
        Self { widget, rx }
    }

    /// Render the icon and start resolving the session
    pub async fn mount(&mut self) {
        self.widget.mount().await;
    }

    /// The chat icon was activated
    pub async fn icon_clicked(&mut self) {
        self.widget.handle_event(SurfaceEvent::IconClicked).await;
    }

    /// The close control was activated
    pub async fn close_clicked(&mut self) {
        self.widget.handle_event(SurfaceEvent::CloseClicked).await;
    }

    /// The input field changed
    pub async fn input_changed(&mut self, text: String) {
        self.widget
            .handle_event(SurfaceEvent::InputChanged { text })
            .await;
    }

    /// The send control was activated
    pub async fn submit(&mut self) {
        self.widget.handle_event(SurfaceEvent::Submit).await;
    }

    /// Handle finished timers and replies (must be called regularly)
    pub async fn poll(&mut self) -> bool {
        self.widget.poll().await
    }

    /// Receive all pending messages from the widget (non-blocking)
    pub fn recv_all(&mut self) -> Vec<WidgetMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            messages.push(msg);
        }
        messages
    }
}

/// Pick the identifier store for this run
fn session_store(config: &WidgetConfig, ephemeral: bool) -> Arc<dyn SessionStore> {
    if ephemeral {
        return Arc::new(MemoryStore::new());
    }
    match config
        .session
        .store_path
        .clone()
        .or_else(FileStore::default_path)
    {
        Some(path) => Arc::new(FileStore::new(path)),
        None => {
            tracing::warn!("No data directory available, session identifier will not persist");
            Arc::new(MemoryStore::new())
        }
    }
}
