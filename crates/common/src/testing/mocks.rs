//! Mock implementations of the session traits

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::auth::{
    CredentialStore, RefreshError, RefreshToken, RefreshTransport, SignInNavigator, TokenPair,
};

type StorageData = Arc<Mutex<HashMap<String, String>>>;
type ReadLog = Arc<Mutex<HashMap<String, usize>>>;

/// In-memory credential store
///
/// Clones share state, so a test can keep a handle for inspection after
/// handing one to a `TokenStore`.
///
/// # Examples
///
/// ```
/// use estatedesk_common::testing::MockCredentialStore;
///
/// let store = MockCredentialStore::new();
/// store.insert("accessToken", "a1");
/// assert_eq!(store.value("accessToken").as_deref(), Some("a1"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockCredentialStore {
    data: StorageData,
    reads: ReadLog,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    fail_removes: Arc<AtomicBool>,
    failing_slots: Arc<Mutex<HashSet<String>>>,
}

impl MockCredentialStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value without going through the trait
    pub fn insert(&self, key: &str, value: &str) {
        self.data.lock().insert(key.to_owned(), value.to_owned());
    }

    /// Drop a value without going through the trait
    pub fn remove_value(&self, key: &str) {
        self.data.lock().remove(key);
    }

    /// Current raw value of a slot
    pub fn value(&self, key: &str) -> Option<String> {
        self.data.lock().get(key).cloned()
    }

    /// Number of trait reads issued for a slot
    pub fn read_count(&self, key: &str) -> usize {
        self.reads.lock().get(key).copied().unwrap_or(0)
    }

    /// Make subsequent reads fail
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent writes fail
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent writes to one slot fail
    pub fn fail_writes_to(&self, key: &str) {
        self.failing_slots.lock().insert(key.to_owned());
    }

    /// Make subsequent removals fail
    pub fn fail_removes(&self, fail: bool) {
        self.fail_removes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl CredentialStore for MockCredentialStore {
    async fn get(&self, key: &str) -> Result<Option<String>, String> {
        *self.reads.lock().entry(key.to_owned()).or_insert(0) += 1;
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(format!("mock read failure for {key}"));
        }
        Ok(self.value(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), String> {
        if self.fail_writes.load(Ordering::SeqCst) || self.failing_slots.lock().contains(key) {
            return Err(format!("mock write failure for {key}"));
        }
        self.insert(key, value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), String> {
        if self.fail_removes.load(Ordering::SeqCst) {
            return Err(format!("mock remove failure for {key}"));
        }
        self.remove_value(key);
        Ok(())
    }
}

/// Scripted refresh endpoint
///
/// Counts calls and, when gated, holds every refresh until
/// [`release`](Self::release) is called so tests can pile up concurrent
/// callers behind one in-flight operation.
#[derive(Debug, Clone)]
pub struct MockRefreshTransport {
    outcome: Arc<Mutex<Result<TokenPair, RefreshError>>>,
    refresh_calls: Arc<AtomicUsize>,
    revoke_calls: Arc<AtomicUsize>,
    last_refresh_token: Arc<Mutex<Option<String>>>,
    fail_revoke: Arc<AtomicBool>,
    gate: Option<Arc<Notify>>,
}

impl MockRefreshTransport {
    fn with_outcome(outcome: Result<TokenPair, RefreshError>) -> Self {
        Self {
            outcome: Arc::new(Mutex::new(outcome)),
            refresh_calls: Arc::new(AtomicUsize::new(0)),
            revoke_calls: Arc::new(AtomicUsize::new(0)),
            last_refresh_token: Arc::new(Mutex::new(None)),
            fail_revoke: Arc::new(AtomicBool::new(false)),
            gate: None,
        }
    }

    /// Every refresh returns `tokens`
    pub fn succeeding(tokens: TokenPair) -> Self {
        Self::with_outcome(Ok(tokens))
    }

    /// Every refresh is rejected with `status`
    pub fn rejecting(status: u16) -> Self {
        Self::with_outcome(Err(RefreshError::Rejected { status }))
    }

    /// Every refresh fails with `error`
    pub fn failing(error: RefreshError) -> Self {
        Self::with_outcome(Err(error))
    }

    /// Hold refresh calls until [`release`](Self::release)
    #[must_use]
    pub fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Notify::new()));
        self
    }

    /// Let a held refresh call complete
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    /// Replace the scripted outcome
    pub fn set_outcome(&self, outcome: Result<TokenPair, RefreshError>) {
        *self.outcome.lock() = outcome;
    }

    /// Make revoke calls fail
    pub fn fail_revoke(&self, fail: bool) {
        self.fail_revoke.store(fail, Ordering::SeqCst);
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn revoke_calls(&self) -> usize {
        self.revoke_calls.load(Ordering::SeqCst)
    }

    /// Refresh token presented on the most recent refresh call
    pub fn last_refresh_token(&self) -> Option<String> {
        self.last_refresh_token.lock().clone()
    }
}

#[async_trait]
impl RefreshTransport for MockRefreshTransport {
    async fn refresh(&self, refresh_token: &RefreshToken) -> Result<TokenPair, RefreshError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_refresh_token.lock() = Some(refresh_token.as_str().to_owned());

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        self.outcome.lock().clone()
    }

    async fn revoke(&self, _refresh_token: &RefreshToken) -> Result<(), RefreshError> {
        self.revoke_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_revoke.load(Ordering::SeqCst) {
            return Err(RefreshError::Transport("mock revoke failure".into()));
        }
        Ok(())
    }
}

/// Navigator that counts sign-in redirects
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    redirects: Arc<AtomicUsize>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn redirects(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl SignInNavigator for RecordingNavigator {
    fn redirect_to_sign_in(&self) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
    }
}
