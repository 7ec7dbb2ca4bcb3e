//! Testing utilities
//!
//! In-memory doubles for the session layer's collaborators. Available to
//! this crate's unit tests and, via the `test-utils` feature, to downstream
//! test suites.
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use estatedesk_common::testing::MockCredentialStore;
//! use estatedesk_common::{TokenSlots, TokenStore};
//!
//! let durable = MockCredentialStore::new();
//! durable.insert("accessToken", "a1");
//! let store = TokenStore::new(Arc::new(durable.clone()), TokenSlots::default());
//! # let _ = store;
//! ```

pub mod mocks;

pub use mocks::{MockCredentialStore, MockRefreshTransport, RecordingNavigator};
