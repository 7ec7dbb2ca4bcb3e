//! Keychain-backed [`CredentialStore`]
//!
//! `keyring` calls block on the OS secret service, so each operation runs on
//! the blocking pool.

use async_trait::async_trait;

use super::traits::CredentialStore;
use crate::security::{KeychainError, KeychainProvider};

async fn run_blocking<T, F>(keychain: &KeychainProvider, op: F) -> Result<T, String>
where
    T: Send + 'static,
    F: FnOnce(&KeychainProvider) -> Result<T, KeychainError> + Send + 'static,
{
    let keychain = keychain.clone();
    tokio::task::spawn_blocking(move || op(&keychain))
        .await
        .map_err(|e| format!("Keychain task failed: {e}"))?
        .map_err(|e| e.to_string())
}

#[async_trait]
impl CredentialStore for KeychainProvider {
    async fn get(&self, key: &str) -> Result<Option<String>, String> {
        let key = key.to_owned();
        run_blocking(self, move |keychain| match keychain.get_secret(&key) {
            Ok(secret) => Ok(Some(secret)),
            Err(KeychainError::NotFound) => Ok(None),
            Err(e) => Err(e),
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), String> {
        let key = key.to_owned();
        let value = value.to_owned();
        run_blocking(self, move |keychain| keychain.set_secret(&key, &value)).await
    }

    async fn remove(&self, key: &str) -> Result<(), String> {
        let key = key.to_owned();
        run_blocking(self, move |keychain| keychain.delete_secret(&key)).await
    }
}
