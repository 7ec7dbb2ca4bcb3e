//! Application configuration structures
//!
//! Every section has serde defaults so a partial file (or an empty one) is a
//! valid configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{
    ACCESS_TOKEN_KEY, DEFAULT_API_BASE_URL, DEFAULT_KEYCHAIN_SERVICE, DEFAULT_LOG_LEVEL,
    DEFAULT_REQUEST_TIMEOUT_SECS, REFRESH_TOKEN_KEY,
};

/// Top-level client configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

/// Backend API settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL that endpoint paths are joined onto (e.g. `https://host/api`)
    pub base_url: String,
    /// Per-call transport timeout
    pub timeout_seconds: u64,
    pub user_agent: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECS,
            user_agent: None,
        }
    }
}

/// Durable session storage settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Keychain service name the token slots live under
    pub keychain_service: String,
    pub access_token_key: String,
    pub refresh_token_key: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            keychain_service: DEFAULT_KEYCHAIN_SERVICE.to_string(),
            access_token_key: ACCESS_TOKEN_KEY.to_string(),
            refresh_token_key: REFRESH_TOKEN_KEY.to_string(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence when set
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: DEFAULT_LOG_LEVEL.to_string(), json: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.session.access_token_key, "accessToken");
        assert_eq!(config.session.refresh_token_key, "refreshToken");
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"api": {"base_url": "https://api.example.com"}}"#).unwrap();
        assert_eq!(config.api.base_url, "https://api.example.com");
        assert_eq!(config.api.timeout_seconds, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert!(!config.logging.json);
    }
}
