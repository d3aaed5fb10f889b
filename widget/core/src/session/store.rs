//! Durable Session Storage
//!
//! Cookie-like key/value storage: every value carries a path scope and an
//! absolute expiry. Expired values read as absent.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from a storage backend
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed
    #[error("Session store I/O failed at {path}: {source}")]
    Io {
        /// Backing file
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The backing file is not valid JSON
    #[error("Session store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// A persisted value with its scope and expiry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredValue {
    /// The stored string
    pub value: String,
    /// Path prefix the value is visible under
    pub path: String,
    /// When the value stops being returned
    pub expires_at: DateTime<Utc>,
}

impl StoredValue {
    /// Create a value that expires `max_age` from now
    #[must_use]
    pub fn new(value: impl Into<String>, path: impl Into<String>, max_age: chrono::Duration) -> Self {
        Self {
            value: value.into(),
            path: path.into(),
            expires_at: Utc::now() + max_age,
        }
    }

    /// Whether the value is still live at `now`
    #[must_use]
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }

    /// Whether a request under `path` can see this value
    #[must_use]
    pub fn visible_from(&self, path: &str) -> bool {
        path.starts_with(&self.path)
    }
}

/// Durable key/value storage for the session identifier
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read a live value visible from `path`
    async fn get(&self, name: &str, path: &str) -> Result<Option<String>, StoreError>;

    /// Write (or replace) a value
    async fn set(&self, name: &str, value: StoredValue) -> Result<(), StoreError>;
}

/// In-memory store, lost when dropped
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, StoredValue>>,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw entry, including expired ones
    #[must_use]
    pub fn entry(&self, name: &str) -> Option<StoredValue> {
        self.entries.lock().get(name).cloned()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn get(&self, name: &str, path: &str) -> Result<Option<String>, StoreError> {
        let now = Utc::now();
        Ok(self
            .entries
            .lock()
            .get(name)
            .filter(|v| v.is_live(now) && v.visible_from(path))
            .map(|v| v.value.clone()))
    }

    async fn set(&self, name: &str, value: StoredValue) -> Result<(), StoreError> {
        self.entries.lock().insert(name.to_string(), value);
        Ok(())
    }
}

/// JSON file store, one object keyed by value name
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl FileStore {
    /// Use the given backing file (created on first write)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Default backing file under the platform data directory
    ///
    /// `$XDG_DATA_HOME/portfolio-chat/session.json` on Linux.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|p| p.join("portfolio-chat").join("session.json"))
    }

    /// Backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<HashMap<String, StoredValue>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(HashMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(source) => Err(StoreError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl SessionStore for FileStore {
    async fn get(&self, name: &str, path: &str) -> Result<Option<String>, StoreError> {
        let now = Utc::now();
        let entries = self.load().await?;
        Ok(entries
            .get(name)
            .filter(|v| v.is_live(now) && v.visible_from(path))
            .map(|v| v.value.clone()))
    }

    async fn set(&self, name: &str, value: StoredValue) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        let now = Utc::now();
        let mut entries = match self.load().await {
            Ok(entries) => entries,
            Err(StoreError::Corrupt(e)) => {
                tracing::warn!(path = %self.path.display(), "Overwriting corrupt session store: {}", e);
                HashMap::new()
            }
            Err(e) => return Err(e),
        };
        entries.retain(|_, v| v.is_live(now));
        entries.insert(name.to_string(), value);

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let json = serde_json::to_vec_pretty(&entries)?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| self.io_error(e))?;

        tracing::debug!(path = %self.path.display(), name, "Session value persisted");
        Ok(())
    }
}
