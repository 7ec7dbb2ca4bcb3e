//! Traits for the collaborators the session layer depends on
//!
//! These traits enable dependency injection and testing by abstracting
//! external dependencies (durable storage, the refresh endpoint, the host
//! application's router).

use async_trait::async_trait;

use super::refresh::RefreshError;
use super::types::{RefreshToken, TokenPair};

/// Durable key-value storage for token slots
///
/// Values must survive a process restart. Implementations may block; callers
/// treat every method as a suspension point.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Read a value
    ///
    /// # Returns
    /// `None` if the key has never been written or was removed
    ///
    /// # Errors
    /// Returns error if the backing store can not be read
    async fn get(&self, key: &str) -> Result<Option<String>, String>;

    /// Write a value, replacing any previous one
    ///
    /// # Errors
    /// Returns error if the write fails
    async fn set(&self, key: &str, value: &str) -> Result<(), String>;

    /// Remove a value (idempotent)
    ///
    /// # Errors
    /// Returns error if the backing store rejects the deletion
    async fn remove(&self, key: &str) -> Result<(), String>;
}

/// Wire calls that exchange or revoke a refresh token
///
/// Implementations must not route through the authenticated dispatcher, so
/// a refresh can never trigger another refresh.
#[async_trait]
pub trait RefreshTransport: Send + Sync {
    /// Exchange a refresh token for a new token pair
    ///
    /// # Errors
    /// Returns `RefreshError::Rejected` for non-2xx responses and
    /// `RefreshError::Transport` when no response was obtained
    async fn refresh(&self, refresh_token: &RefreshToken) -> Result<TokenPair, RefreshError>;

    /// Tell the backend the session is over
    ///
    /// # Errors
    /// Returns error if the notification could not be delivered
    async fn revoke(&self, refresh_token: &RefreshToken) -> Result<(), RefreshError>;
}

/// "Go to sign-in" signal raised when a session can not be recovered
pub trait SignInNavigator: Send + Sync {
    fn redirect_to_sign_in(&self);
}

impl<F> SignInNavigator for F
where
    F: Fn() + Send + Sync,
{
    fn redirect_to_sign_in(&self) {
        self();
    }
}
