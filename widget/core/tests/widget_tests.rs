//! Integration tests for the chat widget
//!
//! These drive a [`ChatWidget`] the way a surface would: events go in through
//! `handle_event`/`send`, and assertions are made on both the widget's state
//! and the [`WidgetMessage`] stream it emits.
//!
//! Tests cover:
//! - Open/close state sequence and animation timing
//! - Exchange outcomes (success, HTTP failure) and transcript growth
//! - Rejection of blank input and of a second send while in flight
//! - Scroll pinning after every append
//! - Session identifier reuse and the unknown-address fallback

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tokio::sync::{mpsc, Notify};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use chatbot_core::{
    ChatBackend, ChatReply, ChatRequest, ChatWidget, ExchangeError, FileStore, HttpChatBackend,
    MemoryStore, Message, SessionIdentity, StaticLookup, SurfaceEvent, WidgetConfig,
    WidgetMessage, WidgetState, FALLBACK_REPLY, UNKNOWN_ADDRESS,
};

// =============================================================================
// Test Infrastructure
// =============================================================================

/// Backend that records requests and answers from a script
struct ScriptedBackend {
    outcome: Result<String, u16>,
    calls: AtomicUsize,
    requests: Mutex<Vec<ChatRequest>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedBackend {
    fn replying(reply: &str) -> Self {
        Self {
            outcome: Ok(reply.to_string()),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    fn failing(status: u16) -> Self {
        Self {
            outcome: Err(status),
            ..Self::replying("")
        }
    }

    /// Hold every reply until the gate is notified
    fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "Scripted"
    }

    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, ExchangeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match &self.outcome {
            Ok(reply) => Ok(ChatReply {
                reply: reply.clone(),
            }),
            Err(status) => Err(ExchangeError::Status(*status)),
        }
    }
}

/// Backend shared between the widget and the test
struct Shared(Arc<ScriptedBackend>);

#[async_trait]
impl ChatBackend for Shared {
    fn name(&self) -> &str {
        self.0.name()
    }

    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, ExchangeError> {
        self.0.send(request).await
    }
}

fn identity(lookup: StaticLookup) -> Arc<SessionIdentity> {
    Arc::new(SessionIdentity::new(
        Arc::new(MemoryStore::new()),
        Arc::new(lookup),
        WidgetConfig::default().session,
    ))
}

fn scripted_widget(
    backend: ScriptedBackend,
) -> (
    ChatWidget<Shared>,
    Arc<ScriptedBackend>,
    mpsc::Receiver<WidgetMessage>,
) {
    let backend = Arc::new(backend);
    let (tx, rx) = mpsc::channel(256);
    let widget = ChatWidget::new(
        Shared(Arc::clone(&backend)),
        identity(StaticLookup::new("203.0.113.9")),
        WidgetConfig::default(),
        tx,
    );
    (widget, backend, rx)
}

async fn open<B: ChatBackend + 'static>(widget: &mut ChatWidget<B>) {
    widget.mount().await;
    widget.handle_event(SurfaceEvent::IconClicked).await;
    widget.run_until_idle().await;
    assert_eq!(widget.state(), WidgetState::Open);
}

fn drain(rx: &mut mpsc::Receiver<WidgetMessage>) -> Vec<WidgetMessage> {
    let mut out = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        out.push(msg);
    }
    out
}

fn states(messages: &[WidgetMessage]) -> Vec<WidgetState> {
    messages
        .iter()
        .filter_map(|m| match m {
            WidgetMessage::State { state, .. } => Some(*state),
            _ => None,
        })
        .collect()
}

// =============================================================================
// Lifecycle
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_open_then_close_sequence() {
    let (mut widget, _backend, mut rx) = scripted_widget(ScriptedBackend::replying("hi"));
    widget.mount().await;

    let start = tokio::time::Instant::now();
    widget.handle_event(SurfaceEvent::IconClicked).await;
    assert_eq!(widget.state(), WidgetState::Opening);
    widget.run_until_idle().await;
    assert!(start.elapsed() >= Duration::from_millis(400));
    assert_eq!(widget.state(), WidgetState::Open);

    widget.handle_event(SurfaceEvent::CloseClicked).await;
    assert_eq!(widget.state(), WidgetState::Closing);
    widget.run_until_idle().await;
    assert!(start.elapsed() >= Duration::from_millis(800));

    assert_eq!(
        states(&drain(&mut rx)),
        vec![
            WidgetState::Closed,
            WidgetState::Opening,
            WidgetState::Open,
            WidgetState::Closing,
            WidgetState::Closed,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_clicks_during_animation_ignored() {
    let (mut widget, _backend, mut rx) = scripted_widget(ScriptedBackend::replying("hi"));
    widget.mount().await;

    widget.handle_event(SurfaceEvent::IconClicked).await;
    widget.handle_event(SurfaceEvent::IconClicked).await;
    widget.handle_event(SurfaceEvent::CloseClicked).await;
    assert!(!widget.send("early").await);
    widget.run_until_idle().await;

    assert_eq!(widget.state(), WidgetState::Open);
    assert!(widget.transcript().is_empty());
    assert_eq!(
        states(&drain(&mut rx)),
        vec![WidgetState::Closed, WidgetState::Opening, WidgetState::Open]
    );
}

#[tokio::test(start_paused = true)]
async fn test_drop_during_animation() {
    let (mut widget, _backend, _rx) = scripted_widget(ScriptedBackend::replying("hi"));
    widget.mount().await;
    widget.handle_event(SurfaceEvent::IconClicked).await;

    // Session resolution reports first; afterwards only the timer task is alive
    widget.settle().await;
    assert!(widget.session_id().is_some());
    assert_eq!(widget.state(), WidgetState::Opening);

    let metrics = tokio::runtime::Handle::current().metrics();
    let alive = metrics.num_alive_tasks();
    assert!(alive >= 1);

    drop(widget);
    for _ in 0..10 {
        if metrics.num_alive_tasks() < alive {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_eq!(metrics.num_alive_tasks(), alive - 1);
}

// =============================================================================
// Exchange
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_hello_scenario() {
    let (mut widget, backend, _rx) = scripted_widget(ScriptedBackend::replying("Hi there!"));
    open(&mut widget).await;

    widget.handle_event(SurfaceEvent::input("Hello")).await;
    widget.handle_event(SurfaceEvent::Submit).await;
    assert!(widget.is_in_flight());
    assert!(!widget.can_send());
    widget.run_until_idle().await;

    assert_eq!(
        widget.transcript().messages(),
        &[Message::user("Hello"), Message::assistant("Hi there!")]
    );
    assert_eq!(widget.input(), "");
    assert!(widget.can_send());
    assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_failure_appends_apology() {
    let (mut widget, _backend, _rx) = scripted_widget(ScriptedBackend::failing(502));
    open(&mut widget).await;

    assert!(widget.send("Hello").await);
    widget.run_until_idle().await;

    assert_eq!(
        widget.transcript().messages(),
        &[Message::user("Hello"), Message::assistant(FALLBACK_REPLY)]
    );
    assert!(widget.can_send());
}

#[tokio::test]
async fn test_http_500_scenario() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = WidgetConfig::default();
    config.animation = Duration::from_millis(1);
    let (tx, _rx) = mpsc::channel(256);
    let mut widget = ChatWidget::new(
        HttpChatBackend::new(server.uri()),
        identity(StaticLookup::new("203.0.113.9")),
        config,
        tx,
    );
    open(&mut widget).await;

    assert!(widget.send("Hello").await);
    widget.run_until_idle().await;

    assert_eq!(
        widget.transcript().messages(),
        &[Message::user("Hello"), Message::assistant(FALLBACK_REPLY)]
    );
    assert_eq!(widget.input(), "");
    assert!(widget.can_send());
}

#[tokio::test(start_paused = true)]
async fn test_transcript_grows_by_two_per_exchange() {
    let (mut widget, backend, _rx) = scripted_widget(ScriptedBackend::replying("ok"));
    open(&mut widget).await;

    for (i, text) in ["one", "two", "three"].into_iter().enumerate() {
        assert!(widget.send(text).await);
        widget.run_until_idle().await;
        assert_eq!(widget.transcript().len(), 2 * (i + 1));
    }
    assert_eq!(backend.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_blank_input_never_sends() {
    let (mut widget, backend, mut rx) = scripted_widget(ScriptedBackend::replying("ok"));
    open(&mut widget).await;
    drain(&mut rx);

    assert!(!widget.send("").await);
    assert!(!widget.send("   ").await);
    widget.handle_event(SurfaceEvent::input("\t\n")).await;
    widget.handle_event(SurfaceEvent::Submit).await;

    assert!(widget.transcript().is_empty());
    assert!(!widget.is_in_flight());
    assert!(drain(&mut rx).is_empty());
    tokio::task::yield_now().await;
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_second_send_rejected_while_in_flight() {
    let gate = Arc::new(Notify::new());
    let (mut widget, backend, _rx) =
        scripted_widget(ScriptedBackend::replying("first").gated(Arc::clone(&gate)));
    open(&mut widget).await;

    assert!(widget.send("one").await);
    assert!(!widget.send("two").await);
    widget.handle_event(SurfaceEvent::input("typed while waiting")).await;
    assert_eq!(widget.input(), "one");

    gate.notify_one();
    widget.run_until_idle().await;

    assert_eq!(
        widget.transcript().messages(),
        &[Message::user("one"), Message::assistant("first")]
    );
    assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_reply_lands_after_close() {
    let gate = Arc::new(Notify::new());
    let (mut widget, _backend, _rx) =
        scripted_widget(ScriptedBackend::replying("late").gated(Arc::clone(&gate)));
    open(&mut widget).await;

    assert!(widget.send("Hello").await);
    widget.handle_event(SurfaceEvent::CloseClicked).await;
    gate.notify_one();
    widget.run_until_idle().await;

    assert_eq!(widget.state(), WidgetState::Closed);
    assert_eq!(widget.transcript().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_scroll_follows_every_append() {
    let (mut widget, _backend, mut rx) = scripted_widget(ScriptedBackend::replying("Hi"));
    open(&mut widget).await;
    drain(&mut rx);

    assert!(widget.send("Hello").await);
    widget.run_until_idle().await;

    let emitted: Vec<WidgetMessage> = drain(&mut rx)
        .into_iter()
        .filter(|m| !matches!(m, WidgetMessage::SessionReady { .. }))
        .collect();
    assert_eq!(
        emitted,
        vec![
            WidgetMessage::Appended {
                index: 0,
                message: Message::user("Hello"),
            },
            WidgetMessage::ScrollToBottom,
            WidgetMessage::AwaitingResponse { waiting: true },
            WidgetMessage::Appended {
                index: 1,
                message: Message::assistant("Hi"),
            },
            WidgetMessage::ScrollToBottom,
            WidgetMessage::InputCleared,
            WidgetMessage::AwaitingResponse { waiting: false },
        ]
    );
}

// =============================================================================
// Session Identity
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_requests_carry_session_id() {
    let (mut widget, backend, _rx) = scripted_widget(ScriptedBackend::replying("ok"));
    open(&mut widget).await;

    assert!(widget.send("one").await);
    widget.run_until_idle().await;
    assert!(widget.send("two").await);
    widget.run_until_idle().await;

    let session_id = widget.session_id().cloned().unwrap();
    let requests = backend.requests.lock();
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|r| r.chatid == session_id.as_str()));
}

#[tokio::test]
async fn test_lookup_failure_uses_unknown() {
    let identity = identity(StaticLookup::failing());

    let id = identity.get_or_create_session_id().await;
    assert!(!id.as_str().is_empty());
    assert_eq!(id.decode().unwrap().address, UNKNOWN_ADDRESS);
}

#[tokio::test]
async fn test_identifier_survives_restart() {
    let dir = TempDir::new().unwrap();
    let store_path = dir.path().join("session.json");
    let config = WidgetConfig::default().session;

    let first = SessionIdentity::new(
        Arc::new(FileStore::new(&store_path)),
        Arc::new(StaticLookup::new("192.0.2.1")),
        config.clone(),
    );
    let id = first.get_or_create_session_id().await;
    assert_eq!(first.get_or_create_session_id().await, id);

    // A fresh manager on the same file must not call the lookup again
    let second = SessionIdentity::new(
        Arc::new(FileStore::new(&store_path)),
        Arc::new(StaticLookup::failing()),
        config,
    );
    assert_eq!(second.get_or_create_session_id().await, id);
}

#[tokio::test]
async fn test_identifier_recovers_from_corrupt_store() {
    let dir = TempDir::new().unwrap();
    let store_path = dir.path().join("session.json");
    tokio::fs::write(&store_path, b"{not json").await.unwrap();
    let config = WidgetConfig::default().session;

    let first = SessionIdentity::new(
        Arc::new(FileStore::new(&store_path)),
        Arc::new(StaticLookup::new("192.0.2.1")),
        config.clone(),
    )
    .get_or_create_session_id()
    .await;

    let second = SessionIdentity::new(
        Arc::new(FileStore::new(&store_path)),
        Arc::new(StaticLookup::new("192.0.2.1")),
        config,
    )
    .get_or_create_session_id()
    .await;

    assert_eq!(first, second);
}
