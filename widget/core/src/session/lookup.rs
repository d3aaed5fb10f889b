//! Public Address Lookup
//!
//! The address is one input to the session token. Lookup failures are
//! expected (offline, blocked, rate limited) and never reach the caller of
//! [`AddressLookup::resolve_or_unknown`].

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Sentinel used in place of an address that could not be resolved
pub const UNKNOWN_ADDRESS: &str = "unknown";

/// Default ipify endpoint
pub const DEFAULT_LOOKUP_URL: &str = "https://api.ipify.org?format=json";

/// Reasons a lookup failed
#[derive(Debug, Error)]
pub enum LookupError {
    /// Request failed or the body was not the expected JSON
    #[error("Address lookup request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered without an address
    #[error("Address lookup returned an empty address")]
    Empty,
}

/// Resolves the caller's public network address
#[async_trait]
pub trait AddressLookup: Send + Sync {
    /// Resolve the address
    async fn resolve(&self) -> Result<String, LookupError>;

    /// Resolve the address, degrading to [`UNKNOWN_ADDRESS`] on any error
    async fn resolve_or_unknown(&self) -> String {
        match self.resolve().await {
            Ok(address) => address,
            Err(e) => {
                tracing::warn!("Address lookup failed, using sentinel: {}", e);
                UNKNOWN_ADDRESS.to_string()
            }
        }
    }
}

#[derive(Deserialize)]
struct IpifyResponse {
    ip: String,
}

/// Lookup against an ipify-compatible endpoint (`{ "ip": "..." }`)
#[derive(Clone, Debug)]
pub struct IpifyLookup {
    url: String,
    http_client: reqwest::Client,
}

impl IpifyLookup {
    /// Create a lookup against `url`
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(url, reqwest::Client::new())
    }

    /// Create a lookup sharing an existing HTTP client
    pub fn with_client(url: impl Into<String>, http_client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            http_client,
        }
    }
}

impl Default for IpifyLookup {
    fn default() -> Self {
        Self::new(DEFAULT_LOOKUP_URL)
    }
}

#[async_trait]
impl AddressLookup for IpifyLookup {
    async fn resolve(&self) -> Result<String, LookupError> {
        let body: IpifyResponse = self
            .http_client
            .get(&self.url)
            .timeout(Duration::from_secs(10))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let ip = body.ip.trim();
        if ip.is_empty() {
            return Err(LookupError::Empty);
        }
        Ok(ip.to_string())
    }
}

/// Fixed answer, for offline operation and tests
#[derive(Clone, Debug)]
pub struct StaticLookup {
    address: Option<String>,
}

impl StaticLookup {
    /// Always resolve to `address`
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
        }
    }

    /// Always fail
    #[must_use]
    pub fn failing() -> Self {
        Self { address: None }
    }
}

#[async_trait]
impl AddressLookup for StaticLookup {
    async fn resolve(&self) -> Result<String, LookupError> {
        self.address.clone().ok_or(LookupError::Empty)
    }
}
