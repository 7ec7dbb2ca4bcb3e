//! EstateDesk API client
//!
//! # Architecture
//!
//! ```text
//! PropertiesApi / UsersApi / AuthService
//!                 │
//!                 ▼
//!            ApiClient ──────────► HttpClient (reqwest)
//!                 │ 401
//!                 ▼
//!        RefreshCoordinator ──► HttpRefreshTransport ──► HttpClient
//!                 │
//!                 ├──► TokenStore
//!                 └──► SignInNavigator (BroadcastNavigator)
//! ```
//!
//! - Structured tracing only; tokens never appear in log fields
//! - Request timeouts live in the HTTP transport
//! - Exactly one refresh-and-retry per logical request

pub mod auth;
pub mod client;
pub mod errors;
pub mod navigation;
pub mod request;
pub mod resources;

pub use auth::{AuthService, HttpRefreshTransport};
pub use client::{ApiClient, ApiClientBuilder, ApiClientConfig};
pub use errors::{map_error_response, ApiError, ApiErrorCategory, ResponseError};
pub use navigation::{BroadcastNavigator, SessionEvent};
pub use request::{FormData, Payload, RequestDescriptor};
pub use resources::{PropertiesApi, UsersApi};
