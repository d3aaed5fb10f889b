//! Main Application
//!
//! The App struct manages the TUI lifecycle as a thin display client:
//! - Event loop (keyboard, mouse, resize)
//! - WidgetClient for the chat widget
//! - DisplayState and PageState for rendering
//!
//! The App:
//! 1. Converts terminal events to widget calls
//! 2. Polls the widget for finished timers and replies
//! 3. Applies WidgetMessages to DisplayState
//! 4. Renders the page with the widget floating bottom-right

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{
    Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::{Frame, Terminal};

use chatbot_core::{AnimationPhase, ContentClient, WidgetConfig, WidgetView};

use crate::display::{DisplayRole, DisplayState};
use crate::page::PageState;
use crate::theme::{
    ACCENT_VIOLET, BOT_BUBBLE, CARD_BORDER, DIM_GRAY, INPUT_BG, PAGE_BG, PANEL_BG, PANEL_TEXT,
    USER_BLUE,
};
use crate::widget_client::WidgetClient;
use crate::widgets::{TextBlock, TextBlockState};

/// Panel size limits (cells)
const PANEL_MAX_WIDTH: u16 = 60;
const PANEL_MAX_HEIGHT: u16 = 30;

/// Icon size (cells)
const ICON_WIDTH: u16 = 9;
const ICON_HEIGHT: u16 = 3;

/// Input box height (lines, including its border)
const INPUT_HEIGHT: u16 = 3;

/// Panel title
const PANEL_TITLE: &str = "Chat Assistant";

/// Main application state
pub struct App {
    // === Core State ===
    /// Is the app still running?
    running: bool,

    // === Widget Integration ===
    /// Client for the embedded chat widget
    client: WidgetClient,
    /// Display state derived from WidgetMessages
    display: DisplayState,
    /// Open/close animation length
    animation: Duration,

    // === Page ===
    /// Blog and repository lists
    page: PageState,
    /// Page scroll position
    page_scroll: TextBlockState,

    // === Hit Areas ===
    /// Where the icon was last drawn
    icon_area: Rect,
    /// Where the close control was last drawn
    close_area: Rect,

    // === Misc State ===
    /// Transcript scroll bookkeeping
    transcript_scroll: TextBlockState,
    /// Frame counter (loader animation)
    tick: usize,
    /// Terminal size
    size: (u16, u16),
}

impl App {
    /// Create a new App instance
    ///
    /// Must be called inside the runtime: the page load starts immediately.
    pub fn new(config: WidgetConfig, ephemeral: bool) -> anyhow::Result<Self> {
        let size = crossterm::terminal::size()?;
        let animation = config.animation;
        let page = PageState::load(ContentClient::from_config(&config.chat));

        Ok(Self {
            running: true,
            client: WidgetClient::new(config, ephemeral),
            display: DisplayState::new(),
            animation,
            page,
            // Clamped on first render, which puts the page at its top
            page_scroll: TextBlockState {
                scroll_offset: usize::MAX,
                total_lines: 0,
            },
            icon_area: Rect::default(),
            close_area: Rect::default(),
            transcript_scroll: TextBlockState::default(),
            tick: 0,
            size,
        })
    }

    /// Main event loop
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        // Target ~30 FPS so the panel animation reads as motion
        let frame_duration = Duration::from_millis(33);

        // Create async event stream for non-blocking terminal events
        let mut event_stream = EventStream::new();

        // Icon first, then start resolving the session
        self.client.mount().await;
        self.process_widget_messages();
        self.render(terminal)?;

        while self.running {
            let frame_start = Instant::now();

            tokio::select! {
                biased;

                // Terminal events - highest priority
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => match event {
                            // Only handle Press events (not Release or Repeat)
                            Event::Key(key) if key.kind == KeyEventKind::Press => {
                                self.handle_key(key).await;
                            }
                            Event::Mouse(mouse) => self.handle_mouse(mouse).await,
                            Event::Resize(w, h) => self.size = (w, h),
                            _ => {}
                        },
                        Some(Err(e)) => tracing::warn!("Terminal event error: {}", e),
                        None => self.running = false,
                    }
                }

                // Frame tick - keep animating even without input
                _ = tokio::time::sleep(Duration::from_millis(16)) => {}
            }

            // Finished animation timers and replies
            self.client.poll().await;
            self.process_widget_messages();
            self.page.poll();

            self.tick = self.tick.wrapping_add(1);
            self.render(terminal)?;

            // Frame rate limiting
            let elapsed = frame_start.elapsed();
            if elapsed < frame_duration {
                tokio::time::sleep(frame_duration - elapsed).await;
            }
        }

        Ok(())
    }

    /// Apply all pending widget messages to the display state
    fn process_widget_messages(&mut self) {
        for msg in self.client.recv_all() {
            self.display.apply_message(msg);
        }
    }

    /// Handle keyboard input
    async fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.running = false;
            return;
        }

        match self.display.view {
            WidgetView::Icon => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => self.running = false,
                KeyCode::Char('c') | KeyCode::Enter => self.client.icon_clicked().await,
                KeyCode::PageUp => self.scroll_page_up(self.page_step()),
                KeyCode::PageDown => self.scroll_page_down(self.page_step()),
                KeyCode::Up => self.scroll_page_up(1),
                KeyCode::Down => self.scroll_page_down(1),
                _ => {}
            },
            WidgetView::Panel => match key.code {
                KeyCode::Esc => self.client.close_clicked().await,
                KeyCode::Enter => self.client.submit().await,
                KeyCode::Char(c) => {
                    if self.display.push_char(c) {
                        self.client.input_changed(self.display.input.clone()).await;
                    }
                }
                KeyCode::Backspace => {
                    if self.display.pop_char() {
                        self.client.input_changed(self.display.input.clone()).await;
                    }
                }
                KeyCode::PageUp => {
                    let total = self.transcript_scroll.total_lines;
                    self.display.scroll_up(self.page_step(), total);
                }
                KeyCode::PageDown => self.display.scroll_down(self.page_step()),
                _ => {}
            },
            // Transitional views have no controls
            WidgetView::Placeholder { .. } => {}
        }
    }

    /// Handle mouse input
    async fn handle_mouse(&mut self, mouse: MouseEvent) {
        let at = Position::new(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => match self.display.view {
                WidgetView::Icon if self.icon_area.contains(at) => {
                    self.client.icon_clicked().await;
                }
                WidgetView::Panel if self.close_area.contains(at) => {
                    self.client.close_clicked().await;
                }
                _ => {}
            },
            MouseEventKind::ScrollUp => {
                if self.display.view == WidgetView::Panel {
                    let total = self.transcript_scroll.total_lines;
                    self.display.scroll_up(3, total);
                } else {
                    self.scroll_page_up(3);
                }
            }
            MouseEventKind::ScrollDown => {
                if self.display.view == WidgetView::Panel {
                    self.display.scroll_down(3);
                } else {
                    self.scroll_page_down(3);
                }
            }
            _ => {}
        }
    }

    fn page_step(&self) -> usize {
        (self.size.1 / 2).max(1) as usize
    }

    fn scroll_page_up(&mut self, lines: usize) {
        self.page_scroll.scroll_offset = self.page_scroll.scroll_offset.saturating_add(lines);
    }

    fn scroll_page_down(&mut self, lines: usize) {
        self.page_scroll.scroll_offset = self.page_scroll.scroll_offset.saturating_sub(lines);
    }

    // ============================================
    // Rendering
    // ============================================

    /// Render the UI
    fn render(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        terminal.draw(|frame| self.draw(frame))?;
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(Style::default().bg(PAGE_BG)), area);

        let body = Rect::new(area.x, area.y, area.width, area.height.saturating_sub(1));
        let status = Rect::new(area.x, area.bottom().saturating_sub(1), area.width, 1);

        self.draw_page(frame, body);
        self.draw_status(frame, status);

        match self.display.view {
            WidgetView::Icon => self.draw_icon(frame, body),
            WidgetView::Placeholder { phase } => self.draw_placeholder(frame, body, phase),
            WidgetView::Panel => self.draw_panel(frame, body),
        }
    }

    fn draw_page(&mut self, frame: &mut Frame, area: Rect) {
        let inner = Rect::new(
            area.x + 2,
            area.y + 1,
            area.width.saturating_sub(4),
            area.height.saturating_sub(1),
        );
        let lines = self.page.lines(self.tick / 4);
        frame.render_stateful_widget(TextBlock::new(&lines), inner, &mut self.page_scroll);
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let hints = match self.display.view {
            WidgetView::Icon => "c chat | PgUp/PgDn scroll | q quit",
            WidgetView::Panel if self.display.waiting => "waiting for reply... | Esc close",
            WidgetView::Panel => "Enter send | Esc close | PgUp/PgDn scroll",
            WidgetView::Placeholder { .. } => "",
        };
        let status = format!(" {} | {}", self.display.widget_state, hints);
        frame.render_widget(
            Paragraph::new(status).style(Style::default().fg(DIM_GRAY).bg(PAGE_BG)),
            area,
        );
    }

    fn draw_icon(&mut self, frame: &mut Frame, area: Rect) {
        self.icon_area = icon_rect(area);
        frame.render_widget(Clear, self.icon_area);
        frame.render_widget(
            Paragraph::new("(•‿•)")
                .centered()
                .block(Block::default().borders(Borders::ALL))
                .style(Style::default().fg(PANEL_TEXT).bg(PANEL_BG)),
            self.icon_area,
        );
    }

    fn draw_placeholder(&self, frame: &mut Frame, area: Rect, phase: AnimationPhase) {
        let fraction = self.display.panel_fraction(self.animation);
        let rect = scale_from_corner(panel_rect(area), fraction);
        if rect.width < 2 || rect.height < 2 {
            return;
        }

        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(CARD_BORDER))
            .style(Style::default().bg(PANEL_BG));
        // Shrinking shows the header it is leaving; expanding starts empty
        if phase == AnimationPhase::Shrink {
            block = block.title(PANEL_TITLE).title_style(Style::default().fg(DIM_GRAY));
        }

        frame.render_widget(Clear, rect);
        frame.render_widget(block, rect);
    }

    fn draw_panel(&mut self, frame: &mut Frame, area: Rect) {
        let rect = panel_rect(area);
        frame.render_widget(Clear, rect);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(PANEL_TITLE)
            .title_style(Style::default().fg(PANEL_TEXT).add_modifier(Modifier::BOLD))
            .border_style(Style::default().fg(CARD_BORDER))
            .style(Style::default().bg(PANEL_BG));
        let inner = block.inner(rect);
        frame.render_widget(block, rect);

        // Close control in the top border
        self.close_area = Rect::new(rect.right().saturating_sub(4), rect.y, 3, 1);
        frame.render_widget(
            Paragraph::new("[×]").style(Style::default().fg(PANEL_TEXT).bg(PANEL_BG)),
            self.close_area,
        );

        let transcript_height = inner.height.saturating_sub(INPUT_HEIGHT);
        let transcript_area = Rect::new(
            inner.x + 1,
            inner.y,
            inner.width.saturating_sub(2),
            transcript_height,
        );
        let input_area = Rect::new(
            inner.x,
            inner.y + transcript_height,
            inner.width,
            INPUT_HEIGHT.min(inner.height),
        );

        let lines = transcript_lines(&self.display);
        self.transcript_scroll.scroll_offset = self.display.scroll_offset;
        frame.render_stateful_widget(
            TextBlock::new(&lines),
            transcript_area,
            &mut self.transcript_scroll,
        );
        self.display.scroll_offset = self.transcript_scroll.scroll_offset;

        self.draw_input(frame, input_area);
    }

    fn draw_input(&self, frame: &mut Frame, area: Rect) {
        let (text, style) = if self.display.waiting {
            (
                format!("{} ...", self.display.input),
                Style::default().fg(DIM_GRAY).bg(INPUT_BG),
            )
        } else {
            (
                format!("{}_", self.display.input),
                Style::default().fg(PANEL_TEXT).bg(INPUT_BG),
            )
        };
        let send_style = if self.display.waiting {
            Style::default().fg(DIM_GRAY)
        } else {
            Style::default().fg(USER_BLUE).add_modifier(Modifier::BOLD)
        };

        let block = Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(CARD_BORDER))
            .title_bottom(ratatui::text::Line::styled("Send ⏎", send_style).right_aligned());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        // Keep the cursor end of long input visible
        let width = inner.width.saturating_sub(1) as usize;
        let visible: String = if text.chars().count() > width {
            text.chars().skip(text.chars().count() - width).collect()
        } else {
            text
        };
        frame.render_widget(Paragraph::new(visible).style(style), inner);
    }
}

// ============================================
// Layout helpers
// ============================================

/// Icon position: bottom-right corner of `area`
pub fn icon_rect(area: Rect) -> Rect {
    let width = ICON_WIDTH.min(area.width);
    let height = ICON_HEIGHT.min(area.height);
    Rect::new(
        area.right().saturating_sub(width + 2),
        area.bottom().saturating_sub(height + 1),
        width,
        height,
    )
}

/// Open panel footprint: bottom-right, at most 95% wide and 80% tall
pub fn panel_rect(area: Rect) -> Rect {
    let width = PANEL_MAX_WIDTH.min(percent_of(area.width, 95)).max(1);
    let height = PANEL_MAX_HEIGHT.min(percent_of(area.height, 80)).max(1);
    Rect::new(
        area.right().saturating_sub(width + 1),
        area.bottom().saturating_sub(height),
        width,
        height,
    )
}

/// `pct` percent of `value`, computed wide so large terminals cannot overflow
fn percent_of(value: u16, pct: u32) -> u16 {
    u16::try_from(u32::from(value) * pct / 100).unwrap_or(u16::MAX)
}

/// Shrink `rect` toward its bottom-right corner
pub fn scale_from_corner(rect: Rect, fraction: f32) -> Rect {
    let fraction = fraction.clamp(0.0, 1.0);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let scale = |v: u16| (f32::from(v) * fraction).round() as u16;
    let width = scale(rect.width);
    let height = scale(rect.height);
    Rect::new(rect.right() - width, rect.bottom() - height, width, height)
}

/// Styled transcript lines, one blank line between messages
pub fn transcript_lines(display: &DisplayState) -> Vec<(String, Style)> {
    let mut lines = Vec::new();
    for msg in &display.messages {
        let style = match msg.role {
            DisplayRole::User => Style::default().fg(USER_BLUE),
            DisplayRole::Assistant => Style::default().fg(PANEL_TEXT).bg(BOT_BUBBLE),
        };
        let mut content = msg.content.lines();
        let first = content.next().unwrap_or_default();
        lines.push((format!("{}{}", msg.role.prefix(), first), style));
        for rest in content {
            lines.push((rest.to_string(), style));
        }
        lines.push((String::new(), Style::default()));
    }
    if display.waiting {
        lines.push(("...".to_string(), Style::default().fg(ACCENT_VIOLET)));
    }
    lines
}
