//! Shared building blocks for the EstateDesk client crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - default: session primitives (token store, refresh coordination)
//! - `platform`: keychain-backed credential storage
//! - `test-utils`: in-memory mocks for downstream test suites

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod auth;

// Platform tier
// -------------------------------------------------------------------
#[cfg(feature = "platform")]
pub mod security;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(any(feature = "test-utils", test))]
pub mod testing;

// Re-export commonly used types and traits for convenience
// ------------------------
pub use auth::{
    AccessToken, CredentialStore, RefreshCoordinator, RefreshError, RefreshToken,
    RefreshTransport, SignInNavigator, TokenPair, TokenSlots, TokenStore, TokenStoreError,
};
#[cfg(feature = "platform")]
pub use security::{KeychainError, KeychainProvider};
