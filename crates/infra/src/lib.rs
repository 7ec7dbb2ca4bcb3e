//! # EstateDesk Infrastructure
//!
//! I/O-bound implementations behind the session layer in
//! `estatedesk-common`.
//!
//! This crate contains:
//! - The authenticated request dispatcher ([`api::ApiClient`])
//! - Session flows and the refresh wire calls ([`api::auth`])
//! - Thin resource wrappers over the dispatcher ([`api::resources`])
//! - The `reqwest` transport wrapper ([`http::HttpClient`])
//! - Configuration loading ([`config`])
//!
//! ## Architecture
//! - Implements traits defined in `estatedesk-common::auth`
//! - Depends on `estatedesk-domain` for wire types and configuration
//! - Contains all "impure" code (HTTP, keychain, filesystem)

pub mod api;
pub mod config;
pub mod errors;
pub mod http;

// Re-export commonly used items
pub use api::{ApiClient, ApiClientConfig, ApiError, ApiErrorCategory, AuthService};
pub use errors::InfraError;
pub use http::HttpClient;
