//! Application constants
//!
//! Centralized location for the wire-level constants shared by the client
//! crates.

// Endpoint namespaces
pub const UNAUTHENTICATED_PREFIX: &str = "auth/";
pub const REFRESH_ENDPOINT: &str = "auth/refresh";
pub const LOGIN_ENDPOINT: &str = "auth/token";
pub const SIGNUP_ENDPOINT: &str = "auth/signup";
pub const LOGOUT_ENDPOINT: &str = "auth/logout";
pub const OAUTH_CALLBACK_PREFIX: &str = "auth/oauth";

// Durable storage slots
pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

// Defaults
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_KEYCHAIN_SERVICE: &str = "EstateDesk.session";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOG_LEVEL: &str = "info";

// User-facing messages
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please sign in again.";
