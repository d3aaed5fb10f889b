//! Theme and Colors
//!
//! Dark page palette with a violet accent, and the light chat panel that
//! floats over it.

use ratatui::style::Color;

// ============================================================================
// Page Palette
// ============================================================================

/// Page background
pub const PAGE_BG: Color = Color::Rgb(13, 18, 36);

/// Card background
pub const CARD_BG: Color = Color::Rgb(27, 32, 62);

/// Card border
pub const CARD_BORDER: Color = Color::Rgb(29, 41, 58);

/// Body text on cards
pub const CARD_TEXT: Color = Color::Rgb(211, 216, 232);

/// Violet accent (headings, loader)
pub const ACCENT_VIOLET: Color = Color::Rgb(167, 139, 250);

/// Link color
pub const LINK_VIOLET: Color = Color::Rgb(139, 92, 246);

// ============================================================================
// Chat Panel
// ============================================================================

/// Panel background
pub const PANEL_BG: Color = Color::Rgb(255, 255, 255);

/// Panel title and assistant text
pub const PANEL_TEXT: Color = Color::Rgb(0, 0, 0);

/// Visitor messages
pub const USER_BLUE: Color = Color::Rgb(0, 120, 212);

/// Assistant message background
pub const BOT_BUBBLE: Color = Color::Rgb(245, 245, 245);

/// Input area background
pub const INPUT_BG: Color = Color::Rgb(250, 250, 250);

/// Disabled controls and hints
pub const DIM_GRAY: Color = Color::Rgb(100, 100, 100);
