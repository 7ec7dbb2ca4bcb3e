//! Session credential infrastructure
//!
//! This module owns the two pieces of shared mutable state behind every
//! authenticated request: the current access token and the single in-flight
//! refresh operation.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────┐
//! │ RefreshCoordinator │  single-flight refresh, sign-out
//! └─────────┬──────────┘
//!           │
//!           ├──► RefreshTransport   (auth/refresh + auth/logout wire calls)
//!           ├──► SignInNavigator    (redirect signal on unrecoverable failure)
//!           │
//!           └──► TokenStore         (memory cache + durable slots)
//!                     │
//!                     └──► CredentialStore  (keychain, mocks)
//! ```
//!
//! # Ownership rules
//!
//! - Token values are written only through [`TokenStore`].
//! - The refresh token is never cached in memory and is read only by
//!   [`RefreshCoordinator`].
//! - The pending-refresh slot is private to [`RefreshCoordinator`].
//!
//! # Usage Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use estatedesk_common::auth::{
//!     CredentialStore, RefreshCoordinator, RefreshTransport, TokenSlots, TokenStore,
//! };
//!
//! # async fn example(
//! #     durable: Arc<dyn CredentialStore>,
//! #     transport: Arc<dyn RefreshTransport>,
//! # ) {
//! let store = Arc::new(TokenStore::new(durable, TokenSlots::default()));
//! let coordinator = RefreshCoordinator::new(store.clone(), transport, Arc::new(|| {
//!     // host application: navigate to the sign-in page
//! }));
//!
//! // Any number of concurrent callers share one refresh call.
//! let fresh = coordinator.refresh().await;
//! # let _ = fresh;
//! # }
//! ```

#[cfg(feature = "platform")]
mod keychain;
pub mod refresh;
pub mod token_store;
pub mod traits;
pub mod types;

pub use refresh::{RefreshCoordinator, RefreshError};
pub use token_store::{TokenSlots, TokenStore, TokenStoreError};
pub use traits::{CredentialStore, RefreshTransport, SignInNavigator};
pub use types::{AccessToken, RefreshToken, TokenPair};
