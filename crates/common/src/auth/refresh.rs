//! Single-flight credential refresh
//!
//! A 401 on a protected endpoint means the access token expired. Many
//! requests can observe that at once, but the refresh token is single use, so
//! exactly one `auth/refresh` call may run per failure window. The first
//! caller starts the operation and parks a shared handle in the pending slot;
//! everyone arriving while it runs awaits that same handle and sees the same
//! outcome. The operation clears the slot itself when it settles, on success
//! and failure alike.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::token_store::TokenStore;
use super::traits::{RefreshTransport, SignInNavigator};
use super::types::AccessToken;

/// Error type for refresh operations
///
/// `Clone` because one outcome is delivered to every waiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    /// No refresh token in durable storage
    #[error("No refresh token available")]
    NoRefreshToken,

    /// Refresh endpoint answered with a non-2xx status
    #[error("Token refresh rejected with status {status}")]
    Rejected { status: u16 },

    /// No response was obtained from the refresh endpoint
    #[error("Token refresh transport failure: {0}")]
    Transport(String),

    /// 2xx response whose body is not a token pair
    #[error("Malformed refresh response: {0}")]
    InvalidResponse(String),

    /// Tokens could not be read or written
    #[error("Token storage failure: {0}")]
    Storage(String),
}

type RefreshOutcome = Result<AccessToken, RefreshError>;
type SharedRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

/// The one in-flight refresh, tagged so it only ever clears its own slot
struct PendingRefresh {
    id: u64,
    handle: SharedRefresh,
}

type PendingSlot = Arc<Mutex<Option<PendingRefresh>>>;

/// Coalesces concurrent refresh requests onto one network call
pub struct RefreshCoordinator {
    store: Arc<TokenStore>,
    transport: Arc<dyn RefreshTransport>,
    navigator: Arc<dyn SignInNavigator>,
    pending: PendingSlot,
    next_id: AtomicU64,
}

impl RefreshCoordinator {
    /// Create a coordinator
    ///
    /// # Arguments
    /// * `store` - Token owner; refreshed tokens are written through it
    /// * `transport` - Performs the `auth/refresh` and `auth/logout` calls
    /// * `navigator` - Signalled when a refresh fails irrecoverably
    #[must_use]
    pub fn new(
        store: Arc<TokenStore>,
        transport: Arc<dyn RefreshTransport>,
        navigator: Arc<dyn SignInNavigator>,
    ) -> Self {
        Self {
            store,
            transport,
            navigator,
            pending: Arc::new(Mutex::new(None)),
            next_id: AtomicU64::new(1),
        }
    }

    /// Token owner shared with the dispatcher
    #[must_use]
    pub fn token_store(&self) -> &Arc<TokenStore> {
        &self.store
    }

    /// Whether a refresh is in flight right now
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.pending.lock().is_some()
    }

    /// Obtain a new access token, joining an in-flight refresh if there is one
    ///
    /// # Errors
    /// Any failure has already cleared both tokens and signalled the
    /// navigator by the time it is returned.
    pub async fn refresh(&self) -> Result<AccessToken, RefreshError> {
        let handle = {
            let mut slot = self.pending.lock();
            match slot.as_ref() {
                Some(pending) => {
                    debug!(refresh_id = pending.id, "Joining in-flight token refresh");
                    pending.handle.clone()
                }
                None => {
                    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                    debug!(refresh_id = id, "Starting token refresh");
                    let handle = self.start(id).boxed().shared();
                    *slot = Some(PendingRefresh { id, handle: handle.clone() });
                    handle
                }
            }
        };

        handle.await
    }

    /// End the session
    ///
    /// Waits out any in-flight refresh so it can not resurrect the session,
    /// notifies the backend on a best-effort basis (failures are logged and
    /// ignored) and clears both tokens.
    ///
    /// # Errors
    /// Returns error only if the local tokens could not be removed
    pub async fn sign_out(&self) -> Result<(), RefreshError> {
        let in_flight = self.pending.lock().as_ref().map(|pending| pending.handle.clone());
        if let Some(handle) = in_flight {
            let _ = handle.await;
        }

        match self.store.refresh_token().await {
            Ok(Some(refresh_token)) => {
                if let Err(e) = self.transport.revoke(&refresh_token).await {
                    warn!(error = %e, "Logout notification failed; continuing with local sign-out");
                }
            }
            Ok(None) => debug!("No refresh token stored; skipping logout notification"),
            Err(e) => warn!(error = %e, "Could not read refresh token for logout notification"),
        }

        self.store.clear_session().await.map_err(|e| RefreshError::Storage(e.to_string()))?;
        info!("Signed out");

        Ok(())
    }

    fn start(&self, id: u64) -> impl std::future::Future<Output = RefreshOutcome> + Send + 'static {
        let store = Arc::clone(&self.store);
        let transport = Arc::clone(&self.transport);
        let navigator = Arc::clone(&self.navigator);
        let pending = Arc::clone(&self.pending);

        async move {
            let outcome = run_refresh(&store, transport.as_ref()).await;

            if let Err(e) = &outcome {
                error!(refresh_id = id, error = %e, "Token refresh failed; clearing session");
                if let Err(clear_err) = store.clear_session().await {
                    error!(refresh_id = id, error = %clear_err, "Failed to clear session tokens");
                }
                navigator.redirect_to_sign_in();
            } else {
                info!(refresh_id = id, "Access token refreshed");
            }

            clear_pending(&pending, id);
            outcome
        }
    }
}

async fn run_refresh(store: &TokenStore, transport: &dyn RefreshTransport) -> RefreshOutcome {
    let refresh_token = store
        .refresh_token()
        .await
        .map_err(|e| RefreshError::Storage(e.to_string()))?
        .ok_or(RefreshError::NoRefreshToken)?;

    let tokens = transport.refresh(&refresh_token).await?;
    let access_token = tokens.access_token.clone();

    store.set_session(tokens).await.map_err(|e| RefreshError::Storage(e.to_string()))?;

    Ok(access_token)
}

fn clear_pending(pending: &Mutex<Option<PendingRefresh>>, id: u64) {
    let mut slot = pending.lock();
    if slot.as_ref().is_some_and(|current| current.id == id) {
        *slot = None;
    }
}
