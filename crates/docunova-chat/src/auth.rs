//! Bearer tokens for backend requests.
//!
//! The identity provider is external. The client only needs a token per
//! request and a way to forget a token the backend rejected.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use docunova_common::PlatformError;
use docunova_platform::KeyValueStore;
use tracing::{debug, warn};

use crate::ApiError;

/// Key under which the last known token is cached.
pub const TOKEN_KEY: &str = "token";

#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Token for the next request, if any.
    async fn token(&self) -> Option<String>;

    /// Forget the cached token. Called after the backend answers 401.
    fn clear_cached(&self);
}

/// Upstream issuer of fresh tokens (a signed-in identity session).
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fresh_token(&self) -> Result<Option<String>, ApiError>;
}

/// Token provider backed by the key-value store.
///
/// The upstream source is asked first and a fresh token is written
/// through; without one, the cached token is used.
pub struct StoredTokenProvider {
    store: Arc<dyn KeyValueStore>,
    source: Option<Arc<dyn TokenSource>>,
}

impl StoredTokenProvider {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            source: None,
        }
    }

    pub fn with_source(mut self, source: Arc<dyn TokenSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Replace the cached token, e.g. from `DOCUNOVA_TOKEN`.
    pub fn seed(&self, token: &str) -> Result<(), PlatformError> {
        let token = token.trim();
        if token.is_empty() {
            return Ok(());
        }
        self.store.set(TOKEN_KEY, token)
    }

    pub fn has_cached(&self) -> bool {
        self.cached().is_some()
    }

    fn cached(&self) -> Option<String> {
        self.store.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }
}

#[async_trait]
impl TokenProvider for StoredTokenProvider {
    async fn token(&self) -> Option<String> {
        if let Some(source) = &self.source {
            match source.fresh_token().await {
                Ok(Some(token)) => {
                    if let Err(e) = self.store.set(TOKEN_KEY, &token) {
                        warn!("failed to cache token: {e}");
                    }
                    return Some(token);
                }
                Ok(None) => {}
                Err(e) => debug!("token source unavailable: {e}"),
            }
        }
        self.cached()
    }

    fn clear_cached(&self) {
        if let Err(e) = self.store.remove(TOKEN_KEY) {
            warn!("failed to clear cached token: {e}");
        }
    }
}

impl fmt::Debug for StoredTokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredTokenProvider")
            .field(
                "token",
                &if self.has_cached() { "[REDACTED]" } else { "<none>" },
            )
            .field("source", &self.source.is_some())
            .finish()
    }
}
