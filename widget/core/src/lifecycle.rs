//! Widget Lifecycle
//!
//! The chat panel moves through four states:
//!
//! ```text
//!   Closed ──icon──▶ Opening ──timer──▶ Open
//!     ▲                                  │
//!     └──timer── Closing ◀──close────────┘
//! ```
//!
//! Opening and Closing only ever leave through their animation timer. User
//! input during those states is dropped, which the rendering contract backs
//! up: the transitional views carry no interactive controls.
//!
//! Each timer is tagged with the generation of the transition that scheduled
//! it. A timer whose generation no longer matches is stale and ignored, and
//! dropping an [`AnimationTimer`] aborts the pending task so a torn-down
//! widget never receives a late transition.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Default open/close animation length
pub const DEFAULT_ANIMATION: Duration = Duration::from_millis(400);

/// Lifecycle state of the chat panel
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WidgetState {
    /// Only the icon is visible
    #[default]
    Closed,
    /// Panel is expanding from the icon
    Opening,
    /// Panel is fully interactive
    Open,
    /// Panel is shrinking back to the icon
    Closing,
}

impl WidgetState {
    /// View the surface renders for this state
    #[must_use]
    pub fn view(&self) -> WidgetView {
        match self {
            WidgetState::Closed => WidgetView::Icon,
            WidgetState::Opening => WidgetView::Placeholder {
                phase: AnimationPhase::Expand,
            },
            WidgetState::Open => WidgetView::Panel,
            WidgetState::Closing => WidgetView::Placeholder {
                phase: AnimationPhase::Shrink,
            },
        }
    }

    /// Whether an animation is running
    #[must_use]
    pub fn is_animating(&self) -> bool {
        matches!(self, WidgetState::Opening | WidgetState::Closing)
    }
}

impl std::fmt::Display for WidgetState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WidgetState::Closed => write!(f, "closed"),
            WidgetState::Opening => write!(f, "opening"),
            WidgetState::Open => write!(f, "open"),
            WidgetState::Closing => write!(f, "closing"),
        }
    }
}

/// Direction of a running panel animation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimationPhase {
    /// Growing out of the icon (empty panel)
    Expand,
    /// Shrinking into the icon (last transcript frame, controls disabled)
    Shrink,
}

/// What the surface should draw
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WidgetView {
    /// Chat icon only
    Icon,
    /// Non-interactive panel with the open panel's footprint
    Placeholder {
        /// Which animation is playing
        phase: AnimationPhase,
    },
    /// Transcript, input field and send control
    Panel,
}

impl WidgetView {
    /// Whether this view has controls the visitor can use
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        matches!(self, WidgetView::Icon | WidgetView::Panel)
    }
}

/// A completed state change
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    /// State before
    pub from: WidgetState,
    /// State after
    pub to: WidgetState,
    /// Timer generation to schedule, if the new state is animating
    pub schedule: Option<u64>,
}

/// Lifecycle state machine
#[derive(Debug)]
pub struct Lifecycle {
    state: WidgetState,
    generation: u64,
    duration: Duration,
}

impl Lifecycle {
    /// Create a closed lifecycle with the given animation length
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            state: WidgetState::Closed,
            generation: 0,
            duration,
        }
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> WidgetState {
        self.state
    }

    /// Animation length
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Icon clicked: `Closed → Opening`, ignored elsewhere
    pub fn icon_clicked(&mut self) -> Option<Transition> {
        match self.state {
            WidgetState::Closed => Some(self.begin(WidgetState::Opening)),
            _ => None,
        }
    }

    /// Close clicked: `Open → Closing`, ignored elsewhere
    pub fn close_clicked(&mut self) -> Option<Transition> {
        match self.state {
            WidgetState::Open => Some(self.begin(WidgetState::Closing)),
            _ => None,
        }
    }

    /// Timer fired: `Opening → Open` or `Closing → Closed`
    ///
    /// Returns `None` for a stale generation or a non-animating state.
    pub fn animation_elapsed(&mut self, generation: u64) -> Option<Transition> {
        if generation != self.generation {
            return None;
        }
        let to = match self.state {
            WidgetState::Opening => WidgetState::Open,
            WidgetState::Closing => WidgetState::Closed,
            _ => return None,
        };
        let from = self.state;
        self.state = to;
        Some(Transition {
            from,
            to,
            schedule: None,
        })
    }

    fn begin(&mut self, to: WidgetState) -> Transition {
        self.generation += 1;
        let from = self.state;
        self.state = to;
        Transition {
            from,
            to,
            schedule: Some(self.generation),
        }
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new(DEFAULT_ANIMATION)
    }
}

/// Fixed-delay timer that delivers one event through a channel
///
/// The pending task is aborted when the timer is dropped.
#[derive(Debug)]
pub struct AnimationTimer {
    handle: JoinHandle<()>,
}

impl AnimationTimer {
    /// Deliver `event` on `tx` after `delay`
    pub fn spawn<T>(delay: Duration, tx: mpsc::UnboundedSender<T>, event: T) -> Self
    where
        T: Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if tx.send(event).is_err() {
                tracing::debug!("Animation timer fired after widget was dropped");
            }
        });
        Self { handle }
    }
}

impl Drop for AnimationTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
