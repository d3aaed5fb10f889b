//! Content API Client
//!
//! Fetches the dynamic parts of the page behind the chat widget: blog posts
//! and pinned GitHub repositories. Both come from the same API base as the
//! chat endpoint.
//!
//! Failures are logged and leave the page without that section; nothing here
//! reaches the visitor as an error message.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ChatConfig;

/// Excerpt shown for posts without a description
pub const NO_DESCRIPTION: &str = "No description available.";

/// Lines of description kept in an excerpt
pub const EXCERPT_LINES: usize = 3;

/// Content fetch errors
#[derive(Debug, Error)]
pub enum ContentError {
    /// Request failed or the endpoint returned a non-success status
    #[error("Content request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Body was not the expected JSON list
    #[error("Malformed content response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// One blog post
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPost {
    /// Post title
    #[serde(default)]
    pub title: String,
    /// Link to the post
    #[serde(default)]
    pub url: String,
    /// Markdown description
    #[serde(default)]
    pub description: Option<String>,
    /// Cover image address
    #[serde(default)]
    pub cover_image: Option<String>,
}

impl BlogPost {
    /// Whether the post has a non-empty cover image
    #[must_use]
    pub fn has_cover(&self) -> bool {
        self.cover_image
            .as_deref()
            .is_some_and(|c| !c.trim().is_empty())
    }

    /// First lines of the description, or [`NO_DESCRIPTION`]
    #[must_use]
    pub fn excerpt(&self) -> String {
        match self.description.as_deref() {
            Some(d) if !d.is_empty() => d
                .split('\n')
                .take(EXCERPT_LINES)
                .collect::<Vec<_>>()
                .join("\n"),
            _ => NO_DESCRIPTION.to_string(),
        }
    }
}

/// One pinned repository
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    /// Repository name
    #[serde(default)]
    pub name: String,
    /// Short description
    #[serde(default)]
    pub description: Option<String>,
    /// Link to the repository
    #[serde(default)]
    pub url: String,
    /// Fields this client does not interpret (stars, language, ...)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Keep posts with a cover image, in random order
pub fn prepare_blogs<R: Rng + ?Sized>(posts: Vec<BlogPost>, rng: &mut R) -> Vec<BlogPost> {
    let mut kept: Vec<BlogPost> = posts.into_iter().filter(BlogPost::has_cover).collect();
    kept.shuffle(rng);
    kept
}

/// Everything the page shows besides the widget
///
/// A section is `None` until it loaded. The page counts as loaded only when
/// both sections are present.
#[derive(Clone, Debug, Default)]
pub struct PageContent {
    /// Prepared blog posts
    pub blogs: Option<Vec<BlogPost>>,
    /// Pinned repositories
    pub repositories: Option<Vec<Repository>>,
}

impl PageContent {
    /// Whether both sections loaded
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.blogs.is_some() && self.repositories.is_some()
    }
}

/// HTTP client for the content API
#[derive(Clone, Debug)]
pub struct ContentClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl ContentClient {
    /// Create a client for `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client: reqwest::Client::new(),
        }
    }

    /// Create from the chat configuration (same API base)
    #[must_use]
    pub fn from_config(config: &ChatConfig) -> Self {
        Self::new(config.api_url.clone())
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/api/v1/content/{}", self.base_url, endpoint)
    }

    async fn fetch_list<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
    ) -> Result<Vec<T>, ContentError> {
        let bytes = self
            .http_client
            .get(self.url(endpoint))
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Fetch all blog posts, unfiltered
    ///
    /// # Errors
    ///
    /// Returns [`ContentError`] if the request fails or the body is not a list
    /// of posts.
    pub async fn fetch_blogs(&self) -> Result<Vec<BlogPost>, ContentError> {
        self.fetch_list("blog").await
    }

    /// Fetch pinned repositories
    ///
    /// # Errors
    ///
    /// Returns [`ContentError`] if the request fails or the body is not a list
    /// of repositories.
    pub async fn fetch_pinned_repos(&self) -> Result<Vec<Repository>, ContentError> {
        self.fetch_list("github/pinned").await
    }

    /// Load both page sections
    ///
    /// Blogs load first; if they fail, repositories are not requested.
    pub async fn load_page<R: Rng + ?Sized>(&self, rng: &mut R) -> PageContent {
        let mut page = PageContent::default();

        match self.fetch_blogs().await {
            Ok(posts) => page.blogs = Some(prepare_blogs(posts, rng)),
            Err(e) => {
                tracing::warn!("Failed to load blog posts: {}", e);
                return page;
            }
        }

        match self.fetch_pinned_repos().await {
            Ok(repos) => page.repositories = Some(repos),
            Err(e) => tracing::warn!("Failed to load pinned repositories: {}", e),
        }

        page
    }
}
