//! Session Identity Manager
//!
//! Reads the persisted identifier, or derives and persists a new one.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::OnceCell;

use super::lookup::AddressLookup;
use super::store::{SessionStore, StoredValue};
use super::SessionId;
use crate::config::SessionConfig;

/// User agent reported when none is configured
#[must_use]
pub fn default_user_agent() -> String {
    format!(
        "{}/{} ({}; {})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// Remove every whitespace character
#[must_use]
pub fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Derives, persists and memoizes the per-install chat identifier
pub struct SessionIdentity {
    store: Arc<dyn SessionStore>,
    lookup: Arc<dyn AddressLookup>,
    config: SessionConfig,
    user_agent: String,
    resolved: OnceCell<SessionId>,
}

impl SessionIdentity {
    /// Create a manager over the given store and lookup
    pub fn new(
        store: Arc<dyn SessionStore>,
        lookup: Arc<dyn AddressLookup>,
        config: SessionConfig,
    ) -> Self {
        let user_agent = config.user_agent.clone().unwrap_or_else(default_user_agent);
        Self {
            store,
            lookup,
            config,
            user_agent,
            resolved: OnceCell::new(),
        }
    }

    /// The identifier, if it has already been resolved
    #[must_use]
    pub fn peek(&self) -> Option<&SessionId> {
        self.resolved.get()
    }

    /// Return the persisted identifier, creating it on first use
    ///
    /// Idempotent: concurrent first calls share one resolution, and every
    /// later call returns the same value without touching storage. Never
    /// fails; lookup and storage problems are logged and degrade in place.
    pub async fn get_or_create_session_id(&self) -> SessionId {
        self.resolved
            .get_or_init(|| self.load_or_create())
            .await
            .clone()
    }

    async fn load_or_create(&self) -> SessionId {
        let name = &self.config.cookie_name;
        let path = &self.config.cookie_path;

        match self.store.get(name, path).await {
            Ok(Some(value)) if !value.is_empty() => {
                tracing::debug!("Reusing persisted session identifier");
                return SessionId::from(value);
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("Session store unreadable, creating a new identifier: {}", e),
        }

        let address = self.lookup.resolve_or_unknown().await;
        let agent = strip_whitespace(&self.user_agent);
        let id = SessionId::encode(
            &agent,
            &address,
            Utc::now().timestamp_millis(),
            rand::random::<f64>(),
        );

        let value = StoredValue::new(
            id.as_str(),
            path.as_str(),
            chrono::Duration::days(i64::from(self.config.max_age_days)),
        );
        if let Err(e) = self.store.set(name, value).await {
            tracing::warn!("Failed to persist session identifier: {}", e);
        }

        tracing::info!(address = %address, "Created new session identifier");
        id
    }
}
