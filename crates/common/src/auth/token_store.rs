//! Access token ownership
//!
//! [`TokenStore`] is the single source of truth for the credential attached
//! to outgoing requests:
//! - in-memory cache in front of a durable [`CredentialStore`]
//! - memory and durable slot updated under one lock, so no reader sees one
//!   updated and the other stale
//! - refresh token kept durable-only and readable only from inside this crate

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::traits::CredentialStore;
use super::types::{AccessToken, RefreshToken, TokenPair};

/// Error type for token store operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenStoreError {
    /// Durable store rejected the operation
    #[error("Credential store error: {0}")]
    Storage(String),
}

/// Names of the durable slots the tokens live in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSlots {
    pub access_key: String,
    pub refresh_key: String,
}

impl TokenSlots {
    pub fn new(access_key: impl Into<String>, refresh_key: impl Into<String>) -> Self {
        Self { access_key: access_key.into(), refresh_key: refresh_key.into() }
    }
}

impl Default for TokenSlots {
    fn default() -> Self {
        Self::new("accessToken", "refreshToken")
    }
}

/// Memory cache state
///
/// `Loaded(None)` is a known-absent token (after a clear), distinct from
/// "not read yet".
#[derive(Debug)]
enum CachedToken {
    Unloaded,
    Loaded(Option<AccessToken>),
}

/// Owner of the current access token
pub struct TokenStore {
    durable: Arc<dyn CredentialStore>,
    slots: TokenSlots,
    cache: Mutex<CachedToken>,
}

impl TokenStore {
    /// Create a token store over a durable backend
    ///
    /// Nothing is read until the first [`get_token`](Self::get_token).
    #[must_use]
    pub fn new(durable: Arc<dyn CredentialStore>, slots: TokenSlots) -> Self {
        Self { durable, slots, cache: Mutex::new(CachedToken::Unloaded) }
    }

    /// Current access token, if any
    ///
    /// Returns the cached value when loaded; otherwise reads the durable slot
    /// and caches the result. A failed durable read is logged and reported as
    /// absent without being cached, so the next call tries again.
    pub async fn get_token(&self) -> Option<AccessToken> {
        let mut cache = self.cache.lock().await;
        if let CachedToken::Loaded(token) = &*cache {
            return token.clone();
        }

        match self.durable.get(&self.slots.access_key).await {
            Ok(value) => {
                let token = value.map(AccessToken::from);
                debug!(present = token.is_some(), "Access token loaded from durable store");
                *cache = CachedToken::Loaded(token.clone());
                token
            }
            Err(e) => {
                warn!(error = %e, "Failed to read access token from durable store");
                None
            }
        }
    }

    /// Replace the access token; `None` removes it
    ///
    /// # Errors
    /// Returns error if the durable write fails. A failed write of `Some`
    /// leaves the previous value in place; a failed removal still clears the
    /// memory cache.
    pub async fn set_token(&self, token: Option<AccessToken>) -> Result<(), TokenStoreError> {
        let mut cache = self.cache.lock().await;

        match token {
            Some(token) => {
                self.durable
                    .set(&self.slots.access_key, token.as_str())
                    .await
                    .map_err(TokenStoreError::Storage)?;
                *cache = CachedToken::Loaded(Some(token));
            }
            None => {
                *cache = CachedToken::Loaded(None);
                self.durable.remove(&self.slots.access_key).await.map_err(TokenStoreError::Storage)?;
            }
        }

        Ok(())
    }

    /// Store a freshly issued token pair
    ///
    /// # Errors
    /// Returns error if either durable write fails. A partial write never
    /// leaves a mixed pair behind: both slots and the memory cache are
    /// cleared before the error is returned.
    pub async fn set_session(&self, tokens: TokenPair) -> Result<(), TokenStoreError> {
        let mut cache = self.cache.lock().await;

        let written = match self
            .durable
            .set(&self.slots.access_key, tokens.access_token.as_str())
            .await
        {
            Ok(()) => {
                self.durable.set(&self.slots.refresh_key, tokens.refresh_token.as_str()).await
            }
            Err(e) => Err(e),
        };

        if let Err(e) = written {
            warn!(error = %e, "Failed to store session tokens; clearing both slots");
            *cache = CachedToken::Loaded(None);
            for key in [&self.slots.access_key, &self.slots.refresh_key] {
                if let Err(remove_err) = self.durable.remove(key).await {
                    warn!(error = %remove_err, "Failed to remove token slot after partial write");
                }
            }
            return Err(TokenStoreError::Storage(e));
        }

        *cache = CachedToken::Loaded(Some(tokens.access_token));
        info!("Session tokens stored");

        Ok(())
    }

    /// Remove both tokens
    ///
    /// Memory is cleared first and both durable removals are attempted even
    /// if one fails.
    ///
    /// # Errors
    /// Returns the first durable removal error
    pub async fn clear_session(&self) -> Result<(), TokenStoreError> {
        let mut cache = self.cache.lock().await;
        *cache = CachedToken::Loaded(None);

        let access = self.durable.remove(&self.slots.access_key).await;
        let refresh = self.durable.remove(&self.slots.refresh_key).await;

        info!("Session tokens cleared");

        access.and(refresh).map_err(TokenStoreError::Storage)
    }

    /// Durable refresh token; never cached
    pub(crate) async fn refresh_token(&self) -> Result<Option<RefreshToken>, TokenStoreError> {
        let _cache = self.cache.lock().await;

        self.durable
            .get(&self.slots.refresh_key)
            .await
            .map(|value| value.map(RefreshToken::from))
            .map_err(TokenStoreError::Storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockCredentialStore;

    fn store_with(durable: &MockCredentialStore) -> TokenStore {
        TokenStore::new(Arc::new(durable.clone()), TokenSlots::default())
    }

    #[tokio::test]
    async fn set_then_get_round_trip() {
        let durable = MockCredentialStore::new();
        let store = store_with(&durable);

        store.set_token(Some(AccessToken::from("t1"))).await.unwrap();
        assert_eq!(store.get_token().await, Some(AccessToken::from("t1")));
        assert_eq!(durable.value("accessToken").as_deref(), Some("t1"));

        store.set_token(None).await.unwrap();
        assert_eq!(store.get_token().await, None);
        assert!(durable.value("accessToken").is_none());
    }

    #[tokio::test]
    async fn get_is_idempotent_without_intervening_set() {
        let durable = MockCredentialStore::new();
        durable.insert("accessToken", "persisted");
        let store = store_with(&durable);

        let first = store.get_token().await;
        let second = store.get_token().await;

        assert_eq!(first, Some(AccessToken::from("persisted")));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn durable_slot_is_read_once_then_cached() {
        let durable = MockCredentialStore::new();
        durable.insert("accessToken", "persisted");
        let store = store_with(&durable);

        store.get_token().await;
        store.get_token().await;
        store.get_token().await;

        assert_eq!(durable.read_count("accessToken"), 1);
    }

    #[tokio::test]
    async fn cleared_token_is_not_reloaded_from_durable_store() {
        let durable = MockCredentialStore::new();
        let store = store_with(&durable);
        store.set_session(TokenPair::new("a1", "r1")).await.unwrap();

        durable.fail_removes(true);
        let result = store.clear_session().await;

        assert!(matches!(result, Err(TokenStoreError::Storage(_))));
        assert_eq!(store.get_token().await, None);
    }

    #[tokio::test]
    async fn failed_write_keeps_previous_value() {
        let durable = MockCredentialStore::new();
        let store = store_with(&durable);
        store.set_token(Some(AccessToken::from("old"))).await.unwrap();

        durable.fail_writes(true);
        let result = store.set_token(Some(AccessToken::from("new"))).await;

        assert!(result.is_err());
        assert_eq!(store.get_token().await, Some(AccessToken::from("old")));
    }

    #[tokio::test]
    async fn failed_read_is_retried_on_next_call() {
        let durable = MockCredentialStore::new();
        durable.insert("accessToken", "persisted");
        durable.fail_reads(true);
        let store = store_with(&durable);

        assert_eq!(store.get_token().await, None);

        durable.fail_reads(false);
        assert_eq!(store.get_token().await, Some(AccessToken::from("persisted")));
    }

    #[tokio::test]
    async fn session_writes_both_slots_and_clear_removes_both() {
        let durable = MockCredentialStore::new();
        let store = store_with(&durable);

        store.set_session(TokenPair::new("a1", "r1")).await.unwrap();
        assert_eq!(durable.value("accessToken").as_deref(), Some("a1"));
        assert_eq!(durable.value("refreshToken").as_deref(), Some("r1"));
        assert_eq!(store.refresh_token().await.unwrap(), Some(RefreshToken::from("r1")));

        store.clear_session().await.unwrap();
        assert!(durable.value("accessToken").is_none());
        assert!(durable.value("refreshToken").is_none());
        assert_eq!(store.get_token().await, None);
        assert_eq!(store.refresh_token().await.unwrap(), None);
    }

    #[tokio::test]
    async fn partial_session_write_leaves_no_mixed_pair() {
        let durable = MockCredentialStore::new();
        let store = store_with(&durable);
        store.set_session(TokenPair::new("a-old", "r-old")).await.unwrap();

        durable.fail_writes_to("refreshToken");
        let result = store.set_session(TokenPair::new("a-new", "r-new")).await;

        assert!(matches!(result, Err(TokenStoreError::Storage(_))));
        assert!(durable.value("accessToken").is_none());
        assert!(durable.value("refreshToken").is_none());
        assert_eq!(store.get_token().await, None);
    }

    #[tokio::test]
    async fn failed_access_write_clears_stale_refresh_token() {
        let durable = MockCredentialStore::new();
        let store = store_with(&durable);
        store.set_session(TokenPair::new("a-old", "r-old")).await.unwrap();

        durable.fail_writes_to("accessToken");
        let result = store.set_session(TokenPair::new("a-new", "r-new")).await;

        assert!(result.is_err());
        assert!(durable.value("refreshToken").is_none());
        assert_eq!(store.refresh_token().await.unwrap(), None);
        assert_eq!(store.get_token().await, None);
    }

    #[tokio::test]
    async fn custom_slot_names_are_honoured() {
        let durable = MockCredentialStore::new();
        let store = TokenStore::new(
            Arc::new(durable.clone()),
            TokenSlots::new("desk.access", "desk.refresh"),
        );

        store.set_session(TokenPair::new("a1", "r1")).await.unwrap();

        assert_eq!(durable.value("desk.access").as_deref(), Some("a1"));
        assert_eq!(durable.value("desk.refresh").as_deref(), Some("r1"));
    }
}
