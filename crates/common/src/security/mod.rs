//! Platform secret storage
//!
//! Wraps the OS keychain (macOS Keychain Access, Windows Credential Manager,
//! Linux Secret Service) used to persist session tokens between launches.

pub mod keychain;

pub use keychain::{KeychainError, KeychainProvider};
