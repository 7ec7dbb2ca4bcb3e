//! Keychain provider for session secrets
//!
//! A thin, synchronous wrapper over the `keyring` crate. Every secret lives
//! under one service name (e.g. `EstateDesk.session`) with the logical key
//! as the account.
//!
//! ## Usage
//!
//! ```no_run
//! use estatedesk_common::security::keychain::KeychainProvider;
//!
//! let keychain = KeychainProvider::new("EstateDesk.session");
//! keychain.set_secret("refreshToken", "r1")?;
//! let secret = keychain.get_secret("refreshToken")?;
//! assert_eq!(secret, "r1");
//! # Ok::<(), estatedesk_common::security::KeychainError>(())
//! ```

use keyring::Entry;
use thiserror::Error;
use tracing::debug;

/// Keychain provider scoped to one service name
#[derive(Debug, Clone)]
pub struct KeychainProvider {
    service_name: String,
}

impl KeychainProvider {
    /// Create a new keychain provider for a specific service
    ///
    /// # Arguments
    /// * `service_name` - Service identifier (e.g., "EstateDesk.session")
    pub fn new(service_name: impl Into<String>) -> Self {
        Self { service_name: service_name.into() }
    }

    /// Service name entries are stored under
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Store a secret value in the platform keychain
    ///
    /// # Errors
    /// Returns `KeychainError::AccessFailed` if keychain access fails
    pub fn set_secret(&self, key: &str, value: &str) -> Result<(), KeychainError> {
        debug!(service = %self.service_name, key = %key, "Storing secret in keychain");

        let entry = self.create_entry(key)?;
        entry.set_password(value).map_err(|e| {
            KeychainError::AccessFailed(format!("Failed to store secret for {key}: {e}"))
        })?;

        Ok(())
    }

    /// Retrieve a secret value from the platform keychain
    ///
    /// # Errors
    /// Returns `KeychainError::NotFound` if secret doesn't exist
    /// Returns `KeychainError::AccessFailed` if keychain access fails
    pub fn get_secret(&self, key: &str) -> Result<String, KeychainError> {
        debug!(service = %self.service_name, key = %key, "Retrieving secret from keychain");

        let entry = self.create_entry(key)?;
        entry.get_password().map_err(|e| {
            if matches!(e, keyring::Error::NoEntry) {
                KeychainError::NotFound
            } else {
                KeychainError::AccessFailed(format!("Failed to retrieve secret for {key}: {e}"))
            }
        })
    }

    /// Delete a secret from the platform keychain (idempotent)
    ///
    /// # Errors
    /// Returns `KeychainError::AccessFailed` if the entry exists but can not
    /// be removed
    pub fn delete_secret(&self, key: &str) -> Result<(), KeychainError> {
        debug!(service = %self.service_name, key = %key, "Deleting secret from keychain");

        let entry = self.create_entry(key)?;
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(KeychainError::AccessFailed(format!(
                "Failed to delete secret for {key}: {e}"
            ))),
        }
    }

    /// Check if a secret exists in the keychain
    #[must_use]
    pub fn secret_exists(&self, key: &str) -> bool {
        self.create_entry(key).is_ok_and(|entry| entry.get_password().is_ok())
    }

    fn create_entry(&self, account: &str) -> Result<Entry, KeychainError> {
        Entry::new(&self.service_name, account).map_err(KeychainError::Keyring)
    }
}

/// Keychain error types
#[derive(Debug, Error)]
pub enum KeychainError {
    /// Keychain access failed (permission denied, not available, etc.)
    #[error("Keychain access failed: {0}")]
    AccessFailed(String),

    /// Entry not found in keychain
    #[error("Entry not found")]
    NotFound,

    /// Underlying keyring library error
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_keeps_service_name() {
        let keychain = KeychainProvider::new("EstateDesk.test");
        assert_eq!(keychain.service_name(), "EstateDesk.test");
    }

    #[test]
    fn not_found_is_distinct_from_access_failure() {
        assert_eq!(KeychainError::NotFound.to_string(), "Entry not found");
        assert_eq!(
            KeychainError::AccessFailed("locked".into()).to_string(),
            "Keychain access failed: locked"
        );
    }
}
