//! Display State Types
//!
//! Types that represent the current display state for the TUI.
//! These are derived from WidgetMessages and used for rendering.
//!
//! # Design Philosophy
//!
//! The TUI is a "thin client" - it just renders what the widget tells it to.
//! Display state is the bridge between WidgetMessages and rendering.
//!
//! - DisplayMessage: A rendered transcript entry
//! - DisplayState: Panel state, transcript, input mirror and scroll position

use std::time::{Duration, Instant};

use chatbot_core::{AnimationPhase, Message, Origin, WidgetMessage, WidgetState, WidgetView};

/// A rendered transcript entry
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayMessage {
    /// Position in the transcript
    pub index: usize,
    /// Who sent this message
    pub role: DisplayRole,
    /// The message content
    pub content: String,
}

impl DisplayMessage {
    /// Create a display message from a transcript entry
    pub fn new(index: usize, message: &Message) -> Self {
        Self {
            index,
            role: message.origin().into(),
            content: message.text().to_string(),
        }
    }
}

/// Display role for messages
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayRole {
    /// Visitor input
    User,
    /// Chat endpoint reply
    Assistant,
}

impl From<Origin> for DisplayRole {
    fn from(origin: Origin) -> Self {
        match origin {
            Origin::User => DisplayRole::User,
            Origin::Assistant => DisplayRole::Assistant,
        }
    }
}

impl DisplayRole {
    /// Get the prefix for this role
    pub fn prefix(&self) -> &'static str {
        match self {
            DisplayRole::User => "You: ",
            DisplayRole::Assistant => "Bot: ",
        }
    }
}

/// The full display state for the TUI
#[derive(Debug)]
pub struct DisplayState {
    /// Widget lifecycle state
    pub widget_state: WidgetState,
    /// View to render for it
    pub view: WidgetView,
    /// When the running animation started
    pub animation_started: Option<Instant>,
    /// Transcript entries
    pub messages: Vec<DisplayMessage>,
    /// Mirror of the input field
    pub input: String,
    /// Whether a reply is pending
    pub waiting: bool,
    /// Transcript scroll offset (lines from bottom, 0 = latest)
    pub scroll_offset: usize,
    /// Session identifier, once resolved
    pub session_id: Option<String>,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            widget_state: WidgetState::Closed,
            view: WidgetView::Icon,
            animation_started: None,
            messages: Vec::new(),
            input: String::new(),
            waiting: false,
            scroll_offset: 0,
            session_id: None,
        }
    }
}

impl DisplayState {
    /// Create a new display state
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a WidgetMessage to update display state
    pub fn apply_message(&mut self, msg: WidgetMessage) {
        match msg {
            WidgetMessage::State { state, view } => {
                self.widget_state = state;
                self.view = view;
                self.animation_started = state.is_animating().then(Instant::now);
            }
            WidgetMessage::Appended { index, message } => {
                // Append-only: an index at or below the last one is a duplicate delivery
                if self.messages.last().map_or(true, |last| index > last.index) {
                    self.messages.push(DisplayMessage::new(index, &message));
                }
            }
            WidgetMessage::ScrollToBottom => {
                self.scroll_offset = 0;
            }
            WidgetMessage::AwaitingResponse { waiting } => {
                self.waiting = waiting;
            }
            WidgetMessage::InputCleared => {
                self.input.clear();
            }
            WidgetMessage::SessionReady { session_id } => {
                tracing::debug!("Session identifier ready");
                self.session_id = Some(session_id.to_string());
            }
        }
    }

    /// Whether typing should reach the input field
    pub fn can_type(&self) -> bool {
        self.view == WidgetView::Panel && !self.waiting
    }

    /// Type one character; returns whether the field changed
    pub fn push_char(&mut self, c: char) -> bool {
        if !self.can_type() {
            return false;
        }
        self.input.push(c);
        true
    }

    /// Delete the last character; returns whether the field changed
    pub fn pop_char(&mut self) -> bool {
        self.can_type() && self.input.pop().is_some()
    }

    /// Scroll the transcript up by `lines`, clamped to `total_lines`
    pub fn scroll_up(&mut self, lines: usize, total_lines: usize) {
        let max_scroll = total_lines.saturating_sub(1);
        self.scroll_offset = (self.scroll_offset + lines).min(max_scroll);
    }

    /// Scroll the transcript down by `lines`
    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    /// Share of the panel footprint to draw, 0.0 (icon) to 1.0 (full panel)
    pub fn panel_fraction(&self, duration: Duration) -> f32 {
        match self.view {
            WidgetView::Icon => 0.0,
            WidgetView::Panel => 1.0,
            WidgetView::Placeholder { phase } => {
                let progress = match self.animation_started {
                    Some(start) if !duration.is_zero() => {
                        (start.elapsed().as_secs_f32() / duration.as_secs_f32()).min(1.0)
                    }
                    _ => 1.0,
                };
                match phase {
                    AnimationPhase::Expand => progress,
                    AnimationPhase::Shrink => 1.0 - progress,
                }
            }
        }
    }
}
