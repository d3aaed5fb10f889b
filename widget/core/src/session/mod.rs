//! Session Identity
//!
//! Every install gets one opaque chat identifier, created lazily on first
//! mount and persisted for a year. The chat endpoint uses it to correlate
//! messages from the same visitor across restarts.
//!
//! The identifier is a base64 encoding of
//! `"{agent}-{address}-{millis}-{random}"`. It is a correlation token, not a
//! credential, and the encoding is deliberately reversible.
//!
//! - [`SessionStore`]: durable key/value storage with expiry and path scope
//! - [`AddressLookup`]: resolves the public network address (fails soft)
//! - [`SessionIdentity`]: ties both together behind `get_or_create_session_id`

mod identity;
mod lookup;
mod store;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

pub use identity::{default_user_agent, strip_whitespace, SessionIdentity};
pub use lookup::{
    AddressLookup, IpifyLookup, LookupError, StaticLookup, DEFAULT_LOOKUP_URL, UNKNOWN_ADDRESS,
};
pub use store::{FileStore, MemoryStore, SessionStore, StoreError, StoredValue};

/// Opaque per-install chat identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Encode the raw token components
    #[must_use]
    pub fn encode(agent: &str, address: &str, millis: i64, random: f64) -> Self {
        let raw = format!("{agent}-{address}-{millis}-{random}");
        Self(BASE64_STANDARD.encode(raw.as_bytes()))
    }

    /// The identifier as sent to the chat endpoint
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reverse the encoding, if this identifier was produced by [`encode`]
    ///
    /// [`encode`]: SessionId::encode
    #[must_use]
    pub fn decode(&self) -> Option<TokenParts> {
        let bytes = BASE64_STANDARD.decode(self.0.as_bytes()).ok()?;
        let raw = String::from_utf8(bytes).ok()?;

        // The agent has no whitespace but may contain '-', so split from the right
        let mut parts = raw.rsplitn(4, '-');
        let random = parts.next()?.parse().ok()?;
        let millis = parts.next()?.parse().ok()?;
        let address = parts.next()?.to_string();
        let agent = parts.next()?.to_string();

        Some(TokenParts {
            agent,
            address,
            millis,
            random,
        })
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decoded components of a session identifier
#[derive(Clone, Debug, PartialEq)]
pub struct TokenParts {
    /// User agent with whitespace stripped
    pub agent: String,
    /// Public address, or [`UNKNOWN_ADDRESS`]
    pub address: String,
    /// Creation time, Unix milliseconds
    pub millis: i64,
    /// Random component in `[0, 1)`
    pub random: f64,
}
