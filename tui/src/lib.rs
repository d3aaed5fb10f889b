//! Portfolio TUI - Terminal surface for the portfolio chat widget
//!
//! Renders the blog and pinned-repository page with the chat widget floating
//! in the bottom-right corner.
//!
//! # Architecture
//!
//! - **WidgetClient**: Embeds the headless widget from `chatbot-core`
//! - **Display**: Display state derived from widget messages
//! - **Page**: Background-loaded content behind the widget
//! - **Widgets**: Borderless scrollable text blocks

pub mod app;
pub mod display;
pub mod page;
pub mod theme;
pub mod widget_client;
pub mod widgets;

pub use app::App;
