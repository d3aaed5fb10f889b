//! TextBlock Widget
//!
//! A borderless, scrollable region of pre-styled lines. Lines wrap to the
//! area width; the scroll offset counts from the bottom, so offset 0 always
//! shows the newest line.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::StatefulWidget;
use textwrap::wrap;

/// State for a scrollable text block
#[derive(Debug, Default)]
pub struct TextBlockState {
    /// Scroll offset (lines from bottom, 0 = latest)
    pub scroll_offset: usize,
    /// Total wrapped lines at the last render
    pub total_lines: usize,
}

impl TextBlockState {
    /// Whether lines are hidden above the visible window
    pub fn has_content_above(&self, height: u16) -> bool {
        self.total_lines > self.scroll_offset + height as usize
    }
}

/// A borderless, scrollable text block
pub struct TextBlock<'a> {
    lines: &'a [(String, Style)],
    style: Style,
}

impl<'a> TextBlock<'a> {
    /// Block over `lines`, each with its own style
    pub fn new(lines: &'a [(String, Style)]) -> Self {
        Self {
            lines,
            style: Style::default(),
        }
    }

    /// Base style patched under every line
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }
}

impl StatefulWidget for TextBlock<'_> {
    type State = TextBlockState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        // Wrap text to width
        let wrapped: Vec<(String, Style)> = self
            .lines
            .iter()
            .flat_map(|(line, style)| {
                let style = self.style.patch(*style);
                if line.is_empty() {
                    vec![(String::new(), style)]
                } else {
                    wrap(line, area.width as usize)
                        .into_iter()
                        .map(|cow| (cow.to_string(), style))
                        .collect()
                }
            })
            .collect();

        state.total_lines = wrapped.len();

        // Clamp scroll
        let height = area.height as usize;
        let max_scroll = state.total_lines.saturating_sub(height);
        state.scroll_offset = state.scroll_offset.min(max_scroll);

        let visible_end = state.total_lines - state.scroll_offset;
        let visible_start = visible_end.saturating_sub(height);

        // Render visible lines
        for (i, (line, style)) in wrapped[visible_start..visible_end].iter().enumerate() {
            let y = area.y + i as u16;
            buf.set_stringn(area.x, y, line, area.width as usize, *style);
        }
    }
}
