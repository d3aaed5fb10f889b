//! Chat Widget - The Headless Core
//!
//! The widget owns the lifecycle, the transcript, the input field and the
//! session identifier. It is UI-agnostic: surfaces report what the visitor
//! did with [`SurfaceEvent`] and draw whatever the [`WidgetMessage`] stream
//! tells them.
//!
//! # Execution Model
//!
//! One owner drives the widget through `&mut self`, so only one handler runs
//! at a time. Slow work (identifier resolution, chat requests, animation
//! timers) runs in spawned tasks that report back on an internal channel;
//! the owner drains it with [`ChatWidget::poll`] once per frame or awaits it
//! with [`ChatWidget::settle`].
//!
//! Ordering inside one handler is fixed: the user message is appended (and
//! the view pinned to the bottom) before the request task exists, and the
//! assistant message is appended only after that task reports back.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::WidgetConfig;
use crate::events::SurfaceEvent;
use crate::exchange::{
    ChatBackend, ChatReply, ChatRequest, ExchangeClient, ExchangeError, HttpChatBackend,
};
use crate::lifecycle::{AnimationTimer, Lifecycle, Transition, WidgetState, WidgetView};
use crate::messages::{Message, WidgetMessage};
use crate::session::{IpifyLookup, SessionId, SessionIdentity, SessionStore};
use crate::transcript::Transcript;

/// Completions reported by background tasks
#[derive(Debug)]
enum Internal {
    /// An open/close animation finished
    AnimationElapsed { generation: u64 },
    /// The session identifier is available
    SessionResolved(SessionId),
    /// The in-flight chat request settled
    ExchangeSettled(Result<ChatReply, ExchangeError>),
}

/// The chat widget
pub struct ChatWidget<B: ChatBackend> {
    /// Configuration
    config: WidgetConfig,
    /// Chat endpoint
    backend: Arc<B>,
    /// Session identity manager
    identity: Arc<SessionIdentity>,
    /// Open/close state machine
    lifecycle: Lifecycle,
    /// Conversation so far
    transcript: Transcript,
    /// Input field and in-flight flag
    exchange: ExchangeClient,
    /// Resolved identifier (None until resolution finishes)
    session_id: Option<SessionId>,
    /// Channel to the surface
    tx: mpsc::Sender<WidgetMessage>,
    /// Background task completions
    internal_tx: mpsc::UnboundedSender<Internal>,
    internal_rx: mpsc::UnboundedReceiver<Internal>,
    /// Pending animation timer, aborted on drop
    timer: Option<AnimationTimer>,
    /// Whether `mount` already ran
    mounted: bool,
}

impl ChatWidget<HttpChatBackend> {
    /// Widget talking HTTP to the configured endpoints
    pub fn from_config(
        config: WidgetConfig,
        store: Arc<dyn SessionStore>,
        tx: mpsc::Sender<WidgetMessage>,
    ) -> Self {
        let backend = HttpChatBackend::from_config(&config.chat);
        let lookup = Arc::new(IpifyLookup::new(config.session.ip_lookup_url.clone()));
        let identity = Arc::new(SessionIdentity::new(store, lookup, config.session.clone()));
        Self::new(backend, identity, config, tx)
    }
}

impl<B: ChatBackend + 'static> ChatWidget<B> {
    /// Create a closed, unmounted widget
    pub fn new(
        backend: B,
        identity: Arc<SessionIdentity>,
        config: WidgetConfig,
        tx: mpsc::Sender<WidgetMessage>,
    ) -> Self {
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();
        Self {
            lifecycle: Lifecycle::new(config.animation),
            config,
            backend: Arc::new(backend),
            identity,
            transcript: Transcript::new(),
            exchange: ExchangeClient::new(),
            session_id: None,
            tx,
            internal_tx,
            internal_rx,
            timer: None,
            mounted: false,
        }
    }

    // ============================================
    // Accessors
    // ============================================

    /// Current lifecycle state
    pub fn state(&self) -> WidgetState {
        self.lifecycle.state()
    }

    /// View to render for the current state
    pub fn view(&self) -> WidgetView {
        self.lifecycle.state().view()
    }

    /// Conversation so far
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Current input text
    pub fn input(&self) -> &str {
        self.exchange.input()
    }

    /// Whether a reply is pending
    pub fn is_in_flight(&self) -> bool {
        self.exchange.is_in_flight()
    }

    /// Whether the send control is enabled
    pub fn can_send(&self) -> bool {
        self.state() == WidgetState::Open && self.exchange.can_send()
    }

    /// Resolved session identifier, if available yet
    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    /// Configuration in use
    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    // ============================================
    // Lifecycle
    // ============================================

    /// Render the icon, then start resolving the session identifier
    ///
    /// The initial state goes out before resolution is spawned, so the icon
    /// is visible however slow the address lookup is.
    pub async fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.mounted = true;

        self.emit(WidgetMessage::State {
            state: self.state(),
            view: self.view(),
        })
        .await;

        let identity = Arc::clone(&self.identity);
        let tx = self.internal_tx.clone();
        tokio::spawn(async move {
            let id = identity.get_or_create_session_id().await;
            let _ = tx.send(Internal::SessionResolved(id));
        });
    }

    /// Handle an event from the surface
    pub async fn handle_event(&mut self, event: SurfaceEvent) {
        match event {
            SurfaceEvent::IconClicked => {
                if let Some(t) = self.lifecycle.icon_clicked() {
                    self.apply_transition(t).await;
                } else {
                    tracing::debug!(state = %self.state(), "Icon click ignored");
                }
            }
            SurfaceEvent::CloseClicked => {
                if let Some(t) = self.lifecycle.close_clicked() {
                    self.apply_transition(t).await;
                } else {
                    tracing::debug!(state = %self.state(), "Close click ignored");
                }
            }
            SurfaceEvent::InputChanged { text } => {
                if self.state() == WidgetState::Open {
                    self.exchange.set_input(text);
                }
            }
            SurfaceEvent::Submit => {
                self.submit().await;
            }
        }
    }

    /// Type `text` into the field and submit it
    ///
    /// Returns whether an exchange started. Blank text, a pending reply, or
    /// a panel that is not open all make this a no-op.
    pub async fn send(&mut self, text: impl Into<String>) -> bool {
        if self.state() != WidgetState::Open || !self.exchange.set_input(text) {
            return false;
        }
        self.submit().await
    }

    async fn submit(&mut self) -> bool {
        if self.state() != WidgetState::Open {
            tracing::debug!(state = %self.state(), "Submit ignored outside open panel");
            return false;
        }
        let Some(text) = self.exchange.begin() else {
            tracing::debug!(in_flight = self.is_in_flight(), "Submit rejected");
            return false;
        };

        self.append(Message::user(text.clone())).await;
        self.emit(WidgetMessage::AwaitingResponse { waiting: true })
            .await;

        let backend = Arc::clone(&self.backend);
        let identity = Arc::clone(&self.identity);
        let tx = self.internal_tx.clone();
        tokio::spawn(async move {
            let chat_id = identity.get_or_create_session_id().await;
            tracing::debug!(backend = backend.name(), "Sending chat message");
            let outcome = backend.send(&ChatRequest::new(text, &chat_id)).await;
            if tx.send(Internal::ExchangeSettled(outcome)).is_err() {
                tracing::debug!("Chat reply arrived after widget was dropped");
            }
        });

        true
    }

    // ============================================
    // Background completions
    // ============================================

    /// Handle every completion that is already available
    ///
    /// Never waits. Returns whether anything was handled.
    pub async fn poll(&mut self) -> bool {
        let mut handled = false;
        while let Ok(event) = self.internal_rx.try_recv() {
            self.handle_internal(event).await;
            handled = true;
        }
        handled
    }

    /// Wait for the next completion and handle it
    pub async fn settle(&mut self) {
        if let Some(event) = self.internal_rx.recv().await {
            self.handle_internal(event).await;
        }
    }

    /// Wait until no animation is running and no reply is pending
    pub async fn run_until_idle(&mut self) {
        while self.state().is_animating() || self.is_in_flight() {
            self.settle().await;
        }
    }

    async fn handle_internal(&mut self, event: Internal) {
        match event {
            Internal::AnimationElapsed { generation } => {
                if let Some(t) = self.lifecycle.animation_elapsed(generation) {
                    self.apply_transition(t).await;
                }
            }
            Internal::SessionResolved(id) => {
                if self.session_id.is_none() {
                    self.session_id = Some(id.clone());
                    self.emit(WidgetMessage::SessionReady { session_id: id })
                        .await;
                }
            }
            Internal::ExchangeSettled(outcome) => {
                let reply = self.exchange.settle(outcome);
                self.append(reply).await;
                self.emit(WidgetMessage::InputCleared).await;
                self.emit(WidgetMessage::AwaitingResponse { waiting: false })
                    .await;
            }
        }
    }

    // ============================================
    // Helpers
    // ============================================

    async fn apply_transition(&mut self, transition: Transition) {
        tracing::debug!(from = %transition.from, to = %transition.to, "Widget transition");

        self.timer = transition.schedule.map(|generation| {
            AnimationTimer::spawn(
                self.lifecycle.duration(),
                self.internal_tx.clone(),
                Internal::AnimationElapsed { generation },
            )
        });

        self.emit(WidgetMessage::State {
            state: transition.to,
            view: transition.to.view(),
        })
        .await;
    }

    /// Append to the transcript and pin the view to it
    async fn append(&mut self, message: Message) {
        let index = self.transcript.push(message.clone());
        self.emit(WidgetMessage::Appended { index, message }).await;
        self.emit(WidgetMessage::ScrollToBottom).await;
    }

    /// Send a message to the surface
    async fn emit(&self, msg: WidgetMessage) {
        if let Err(e) = self.tx.send(msg).await {
            tracing::warn!("Failed to send message to surface: {}", e);
        }
    }
}
