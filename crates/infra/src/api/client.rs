//! Authenticated request dispatcher
//!
//! Every domain-level call enters through [`ApiClient`]. For endpoints
//! outside the `auth/` namespace it attaches the current bearer token and,
//! when the backend answers 401, asks the [`RefreshCoordinator`] for a new
//! token and replays the identical request exactly once.

use std::sync::Arc;
use std::time::Duration;

use estatedesk_common::auth::{AccessToken, RefreshCoordinator, TokenStore};
use estatedesk_domain::constants::DEFAULT_REQUEST_TIMEOUT_SECS;
use estatedesk_domain::ApiConfig;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::errors::{map_error_response, ApiError};
use super::request::{encode_query, join_url, FormData, Payload, RequestDescriptor};
use crate::http::HttpClient;

/// Configuration for API client
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// API root (e.g., "https://desk.example.com/api")
    pub base_url: String,
    /// Timeout for each HTTP attempt
    pub timeout: Duration,
    pub user_agent: Option<String>,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        ApiConfig::default().into()
    }
}

impl From<ApiConfig> for ApiClientConfig {
    fn from(config: ApiConfig) -> Self {
        let timeout_seconds = if config.timeout_seconds == 0 {
            DEFAULT_REQUEST_TIMEOUT_SECS
        } else {
            config.timeout_seconds
        };

        Self {
            base_url: config.base_url,
            timeout: Duration::from_secs(timeout_seconds),
            user_agent: config.user_agent,
        }
    }
}

/// API client that owns the 401 → refresh → retry cycle
pub struct ApiClient {
    http_client: HttpClient,
    config: ApiClientConfig,
    coordinator: Arc<RefreshCoordinator>,
}

impl ApiClient {
    /// Create a new API client
    ///
    /// # Arguments
    ///
    /// * `config` - Client configuration
    /// * `coordinator` - Refresh coordinator; its token store supplies the
    ///   bearer token
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created
    pub fn new(
        config: ApiClientConfig,
        coordinator: Arc<RefreshCoordinator>,
    ) -> Result<Self, ApiError> {
        let mut builder = HttpClient::builder().timeout(config.timeout);
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        let http_client = builder
            .build()
            .map_err(|e| ApiError::Config(format!("Failed to build HttpClient: {e}")))?;

        Ok(Self { http_client, config, coordinator })
    }

    /// Create a builder for fluent configuration
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    pub fn config(&self) -> &ApiClientConfig {
        &self.config
    }

    pub fn token_store(&self) -> &Arc<TokenStore> {
        self.coordinator.token_store()
    }

    pub fn coordinator(&self) -> &Arc<RefreshCoordinator> {
        &self.coordinator
    }

    /// Send one logical request and return its JSON body
    ///
    /// `GET` encodes `data` as query parameters; other methods send it as a
    /// JSON body.
    ///
    /// # Errors
    ///
    /// - `ApiError::Response` for a non-2xx answer (after the retry, if one
    ///   happened)
    /// - `ApiError::SessionExpired` when the refresh after a 401 failed
    /// - `ApiError::Transport` when no response was obtained
    pub async fn request(
        &self,
        endpoint: &str,
        data: Option<Value>,
        method: Method,
        headers: Option<reqwest::header::HeaderMap>,
    ) -> Result<Value, ApiError> {
        let mut descriptor = RequestDescriptor::new(endpoint, method);
        if let Some(data) = data {
            descriptor = descriptor.with_data(data);
        }
        if let Some(headers) = headers {
            descriptor = descriptor.with_headers(headers);
        }

        self.execute(&descriptor).await
    }

    /// Send a multipart form with the same 401 contract as [`request`](Self::request)
    ///
    /// # Errors
    ///
    /// Same as [`request`](Self::request)
    pub async fn request_form_data(
        &self,
        endpoint: &str,
        form: FormData,
        method: Method,
    ) -> Result<Value, ApiError> {
        self.execute(&RequestDescriptor::new(endpoint, method).with_form(form)).await
    }

    /// Dispatch a prepared descriptor
    ///
    /// # Errors
    ///
    /// Same as [`request`](Self::request)
    #[instrument(skip(self, descriptor), fields(endpoint = %descriptor.endpoint(), method = %descriptor.method()))]
    pub async fn execute(&self, descriptor: &RequestDescriptor) -> Result<Value, ApiError> {
        let protected = !descriptor.is_unauthenticated();
        let token = if protected { self.token_store().get_token().await } else { None };

        let mut response = self.send_once(descriptor, token.as_ref()).await?;

        if protected && response.status() == StatusCode::UNAUTHORIZED {
            info!("Access token rejected; refreshing session");

            if let Err(e) = self.coordinator.refresh().await {
                warn!(error = %e, "Session refresh failed");
                return Err(ApiError::session_expired());
            }

            let token = self.token_store().get_token().await;
            debug!("Replaying request with refreshed token");
            response = self.send_once(descriptor, token.as_ref()).await?;
        }

        Self::read_body(response).await
    }

    /// Execute a GET request and deserialize the body
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body does not decode as `T`
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.send_typed(endpoint, Method::GET, None).await
    }

    /// Execute a GET request with query parameters
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body does not decode as `T`
    pub async fn get_with_query<Q: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &Q,
    ) -> Result<T, ApiError> {
        self.send_typed(endpoint, Method::GET, Some(to_value(query)?)).await
    }

    /// Execute a POST request
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body does not decode as `R`
    pub async fn post<T: Serialize, R: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &T,
    ) -> Result<R, ApiError> {
        self.send_typed(endpoint, Method::POST, Some(to_value(body)?)).await
    }

    /// Execute a PUT request
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body does not decode as `R`
    pub async fn put<T: Serialize, R: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &T,
    ) -> Result<R, ApiError> {
        self.send_typed(endpoint, Method::PUT, Some(to_value(body)?)).await
    }

    /// Execute a PATCH request
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body does not decode as `R`
    pub async fn patch<T: Serialize, R: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &T,
    ) -> Result<R, ApiError> {
        self.send_typed(endpoint, Method::PATCH, Some(to_value(body)?)).await
    }

    /// Execute a DELETE request
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body does not decode as `R`
    pub async fn delete<R: DeserializeOwned>(&self, endpoint: &str) -> Result<R, ApiError> {
        self.send_typed(endpoint, Method::DELETE, None).await
    }

    async fn send_typed<R: DeserializeOwned>(
        &self,
        endpoint: &str,
        method: Method,
        data: Option<Value>,
    ) -> Result<R, ApiError> {
        let body = self.request(endpoint, data, method, None).await?;
        serde_json::from_value(body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn send_once(
        &self,
        descriptor: &RequestDescriptor,
        token: Option<&AccessToken>,
    ) -> Result<Response, ApiError> {
        let url = join_url(&self.config.base_url, descriptor.endpoint());

        let mut headers = descriptor.headers().clone();
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&token.bearer()).map_err(|_| {
                ApiError::InvalidRequest("access token is not a valid header value".into())
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let method = descriptor.method().clone();
        let mut builder = self.http_client.request(method.clone(), &url).headers(headers);

        builder = match descriptor.payload() {
            Payload::Empty => builder,
            Payload::Json(data) if method == Method::GET => builder.query(&encode_query(data)?),
            Payload::Json(data) => builder.json(data),
            Payload::Form(form) => builder.multipart(form.to_multipart()?),
        };

        debug!(url = %url, authenticated = token.is_some(), "Dispatching request");

        self.http_client.send(builder).await.map_err(ApiError::Transport)
    }

    async fn read_body(response: Response) -> Result<Value, ApiError> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let mapped = map_error_response(status.as_u16(), &body);
            debug!(status = status.as_u16(), messages = ?mapped.messages, "Request failed");
            return Err(ApiError::Response(mapped));
        }

        if status == StatusCode::NO_CONTENT || status == StatusCode::RESET_CONTENT {
            return Ok(Value::Null);
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Decode(format!("Failed to read response body: {e}")))?;

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value)
        .map_err(|e| ApiError::InvalidRequest(format!("Failed to serialize body: {e}")))
}

/// Builder for API client
#[derive(Default)]
pub struct ApiClientBuilder {
    config: Option<ApiClientConfig>,
    coordinator: Option<Arc<RefreshCoordinator>>,
}

impl ApiClientBuilder {
    /// Set the API configuration
    pub fn config(mut self, config: ApiClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut config = self.config.take().unwrap_or_default();
        config.base_url = base_url.into();
        self.config = Some(config);
        self
    }

    /// Set the refresh coordinator
    pub fn coordinator(mut self, coordinator: Arc<RefreshCoordinator>) -> Self {
        self.coordinator = Some(coordinator);
        self
    }

    /// Build the API client
    ///
    /// # Errors
    ///
    /// Returns error if the coordinator is missing or client creation fails
    pub fn build(self) -> Result<ApiClient, ApiError> {
        let config = self.config.unwrap_or_default();
        let coordinator = self
            .coordinator
            .ok_or_else(|| ApiError::Config("Refresh coordinator not set".to_string()))?;

        ApiClient::new(config, coordinator)
    }
}
