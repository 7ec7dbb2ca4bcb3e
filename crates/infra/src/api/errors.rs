//! API error types and the error-response mapper
//!
//! Every failed logical request surfaces as one [`ApiError`]. Responses the
//! backend produced carry a [`ResponseError`] (`status` plus an ordered,
//! never-empty list of messages) built by [`map_error_response`].

use std::fmt;

use estatedesk_domain::constants::SESSION_EXPIRED_MESSAGE;
use estatedesk_domain::DeskError;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Categories of API errors, used for logging and UI decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// 401/403, or a session that could not be refreshed
    Authentication,
    /// 429
    RateLimit,
    /// 5xx
    Server,
    /// Other 4xx (validation, conflicts, not found)
    Client,
    /// No response was obtained
    Network,
    /// A 2xx body that does not have the expected shape
    Decode,
    /// Local failures: bad configuration, invalid request, token storage
    Config,
}

/// A non-2xx response reduced to its status and user-facing messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseError {
    pub status: u16,
    pub messages: Vec<String>,
}

impl fmt::Display for ResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}: {}", self.status, self.messages.join("; "))
    }
}

/// API operation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The backend answered with a non-2xx status
    #[error("{0}")]
    Response(ResponseError),

    /// The session could not be refreshed; the user has to sign in again
    #[error("{0}")]
    SessionExpired(ResponseError),

    /// No response was obtained
    #[error("Transport error: {0}")]
    Transport(DeskError),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Token storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// The synthesized error returned when a refresh fails
    #[must_use]
    pub fn session_expired() -> Self {
        Self::SessionExpired(ResponseError {
            status: StatusCode::UNAUTHORIZED.as_u16(),
            messages: vec![SESSION_EXPIRED_MESSAGE.to_string()],
        })
    }

    /// HTTP status for response-backed errors
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Response(err) | Self::SessionExpired(err) => Some(err.status),
            _ => None,
        }
    }

    /// Backend messages; empty for errors without a response
    #[must_use]
    pub fn messages(&self) -> &[String] {
        match self {
            Self::Response(err) | Self::SessionExpired(err) => &err.messages,
            _ => &[],
        }
    }

    /// Text suitable for showing to the user
    #[must_use]
    pub fn user_message(&self) -> String {
        self.messages().first().cloned().unwrap_or_else(|| self.to_string())
    }

    #[must_use]
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired(_))
    }

    #[must_use]
    pub fn is_conflict(&self) -> bool {
        self.status() == Some(StatusCode::CONFLICT.as_u16())
    }

    /// Get the error category for this error
    #[must_use]
    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::SessionExpired(_) => ApiErrorCategory::Authentication,
            Self::Response(err) => match err.status {
                401 | 403 => ApiErrorCategory::Authentication,
                429 => ApiErrorCategory::RateLimit,
                500..=599 => ApiErrorCategory::Server,
                _ => ApiErrorCategory::Client,
            },
            Self::Transport(_) => ApiErrorCategory::Network,
            Self::Decode(_) => ApiErrorCategory::Decode,
            Self::InvalidRequest(_) | Self::Storage(_) | Self::Config(_) => {
                ApiErrorCategory::Config
            }
        }
    }
}

impl From<ApiError> for DeskError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Transport(inner) => inner,
            ApiError::SessionExpired(_) => Self::Auth(err.user_message()),
            ApiError::Response(ref response) => match response.status {
                401 | 403 => Self::Auth(err.user_message()),
                404 => Self::NotFound(err.user_message()),
                400..=499 => Self::InvalidInput(err.user_message()),
                _ => Self::Network(err.to_string()),
            },
            ApiError::Decode(message) => Self::Serialization(message),
            ApiError::InvalidRequest(message) => Self::InvalidInput(message),
            ApiError::Storage(message) => Self::Storage(message),
            ApiError::Config(message) => Self::Config(message),
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: Option<ErrorMessage>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorMessage {
    One(String),
    Many(Vec<String>),
}

/// Reduce a failed response to its status and messages
///
/// Messages come from `body.error.message` (a string or an array of
/// strings). A body that is not JSON, lacks that field or carries no
/// messages falls back to the status text.
#[must_use]
pub fn map_error_response(status: u16, body: &str) -> ResponseError {
    let messages = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.error)
        .and_then(|detail| detail.message)
        .map(|message| match message {
            ErrorMessage::One(text) => vec![text],
            ErrorMessage::Many(list) => list,
        })
        .filter(|messages| !messages.is_empty())
        .unwrap_or_else(|| vec![status_text(status)]);

    ResponseError { status, messages }
}

fn status_text(status: u16) -> String {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .map_or_else(|| format!("HTTP {status}"), str::to_string)
}
