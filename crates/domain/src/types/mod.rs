//! Domain types and models
//!
//! Only the shapes the client core touches are modelled; endpoint-specific
//! payloads otherwise travel as `serde_json::Value`.

pub mod property;
pub mod session;
pub mod user;

pub use property::{NewProperty, Property, PropertyUpdate};
pub use session::{AuthTokens, Credentials, OAuthCallback, SignupRequest};
pub use user::User;
