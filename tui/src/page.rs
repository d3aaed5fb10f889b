//! Page Behind the Widget
//!
//! Loads the blog and pinned-repository lists in the background and turns
//! them into styled lines. Until both lists arrive the page shows a loader;
//! a failed fetch leaves it there.

use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::style::{Modifier, Style};
use tokio::sync::oneshot;
use unicode_width::UnicodeWidthStr;

use chatbot_core::content::NO_DESCRIPTION;
use chatbot_core::{BlogPost, ContentClient, PageContent, Repository};

use crate::theme::{ACCENT_VIOLET, CARD_TEXT, DIM_GRAY, LINK_VIOLET};

/// Loader animation frames
const LOADER_FRAMES: &[&str] = &["ᗧ· · ·", " ᗧ· ·", "  ᗧ·", "   ᗧ", "  ᗤ ", " ᗤ  "];

/// Page content and its loading status
pub struct PageState {
    /// Loaded sections
    pub content: PageContent,
    /// Pending background load
    pending: Option<oneshot::Receiver<PageContent>>,
}

impl PageState {
    /// Start loading both sections in the background
    pub fn load(client: ContentClient) -> Self {
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let mut rng = StdRng::from_entropy();
            let page = client.load_page(&mut rng).await;
            let _ = tx.send(page);
        });
        Self {
            content: PageContent::default(),
            pending: Some(rx),
        }
    }

    /// Page with already-known content
    pub fn with_content(content: PageContent) -> Self {
        Self {
            content,
            pending: None,
        }
    }

    /// Pick up a finished load (non-blocking); returns whether it landed
    pub fn poll(&mut self) -> bool {
        let Some(rx) = self.pending.as_mut() else {
            return false;
        };
        match rx.try_recv() {
            Ok(content) => {
                self.content = content;
                self.pending = None;
                true
            }
            Err(oneshot::error::TryRecvError::Empty) => false,
            Err(oneshot::error::TryRecvError::Closed) => {
                tracing::warn!("Page load task ended without content");
                self.pending = None;
                false
            }
        }
    }

    /// Whether the loader is showing
    pub fn is_loading(&self) -> bool {
        !self.content.is_ready()
    }

    /// Styled lines for the page, or the loader frame for `tick`
    pub fn lines(&self, tick: usize) -> Vec<(String, Style)> {
        if self.is_loading() {
            let frame = LOADER_FRAMES[tick % LOADER_FRAMES.len()];
            return vec![(frame.to_string(), Style::default().fg(ACCENT_VIOLET))];
        }

        let mut lines = Vec::new();
        if let Some(repos) = &self.content.repositories {
            heading(&mut lines, "Pinned Repositories");
            for repo in repos {
                repository_lines(&mut lines, repo);
            }
        }
        if let Some(blogs) = &self.content.blogs {
            heading(&mut lines, "Blog");
            for post in blogs {
                blog_lines(&mut lines, post);
            }
        }
        lines
    }
}

fn heading(lines: &mut Vec<(String, Style)>, title: &str) {
    let style = Style::default()
        .fg(ACCENT_VIOLET)
        .add_modifier(Modifier::BOLD);
    lines.push((title.to_string(), style));
    lines.push(("─".repeat(title.width()), style));
    lines.push((String::new(), Style::default()));
}

fn repository_lines(lines: &mut Vec<(String, Style)>, repo: &Repository) {
    lines.push((
        repo.name.clone(),
        Style::default().fg(CARD_TEXT).add_modifier(Modifier::BOLD),
    ));
    let description = repo
        .description
        .as_deref()
        .filter(|d| !d.is_empty())
        .unwrap_or(NO_DESCRIPTION);
    lines.push((description.to_string(), Style::default().fg(CARD_TEXT)));
    if !repo.url.is_empty() {
        lines.push((repo.url.clone(), Style::default().fg(LINK_VIOLET)));
    }
    lines.push((String::new(), Style::default()));
}

fn blog_lines(lines: &mut Vec<(String, Style)>, post: &BlogPost) {
    lines.push((
        post.title.clone(),
        Style::default().fg(CARD_TEXT).add_modifier(Modifier::BOLD),
    ));
    for line in post.excerpt().lines() {
        lines.push((line.to_string(), Style::default().fg(DIM_GRAY)));
    }
    if !post.url.is_empty() {
        lines.push((post.url.clone(), Style::default().fg(LINK_VIOLET)));
    }
    lines.push((String::new(), Style::default()));
}
