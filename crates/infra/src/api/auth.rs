//! Session flows for the `auth/` namespace
//!
//! [`AuthService`] turns credentials into a stored token pair and ends
//! sessions. [`HttpRefreshTransport`] is the wire binding the refresh
//! coordinator uses; it talks to [`HttpClient`] directly so a refresh can
//! never re-enter the dispatcher.

use std::sync::Arc;

use async_trait::async_trait;
use estatedesk_common::auth::{RefreshError, RefreshToken, RefreshTransport, TokenPair, TokenStore};
use estatedesk_domain::constants::{
    LOGIN_ENDPOINT, LOGOUT_ENDPOINT, OAUTH_CALLBACK_PREFIX, REFRESH_ENDPOINT, SIGNUP_ENDPOINT,
};
use estatedesk_domain::{AuthTokens, Credentials, OAuthCallback, SignupRequest};
use reqwest::Method;
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use super::client::{ApiClient, ApiClientConfig};
use super::errors::ApiError;
use super::request::join_url;
use crate::http::HttpClient;

fn into_pair(tokens: AuthTokens) -> TokenPair {
    TokenPair::new(tokens.access_token, tokens.refresh_token)
}

/// `auth/refresh` and `auth/logout` over plain HTTP
pub struct HttpRefreshTransport {
    http_client: HttpClient,
    base_url: String,
}

impl HttpRefreshTransport {
    pub fn new(http_client: HttpClient, base_url: impl Into<String>) -> Self {
        Self { http_client, base_url: base_url.into() }
    }

    /// Build a transport with the same base URL, timeout and user agent as
    /// the dispatcher
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created
    pub fn from_config(config: &ApiClientConfig) -> Result<Self, ApiError> {
        let mut builder = HttpClient::builder().timeout(config.timeout);
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        let http_client = builder
            .build()
            .map_err(|e| ApiError::Config(format!("Failed to build HttpClient: {e}")))?;

        Ok(Self::new(http_client, config.base_url.clone()))
    }

    async fn post_refresh_token(
        &self,
        endpoint: &str,
        refresh_token: &RefreshToken,
    ) -> Result<reqwest::Response, RefreshError> {
        let url = join_url(&self.base_url, endpoint);
        let request = self
            .http_client
            .request(Method::POST, &url)
            .json(&json!({ "refreshToken": refresh_token.as_str() }));

        let response = self
            .http_client
            .send(request)
            .await
            .map_err(|e| RefreshError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            debug!(endpoint, status = status.as_u16(), "Token endpoint rejected request");
            return Err(RefreshError::Rejected { status: status.as_u16() });
        }

        Ok(response)
    }
}

#[async_trait]
impl RefreshTransport for HttpRefreshTransport {
    async fn refresh(&self, refresh_token: &RefreshToken) -> Result<TokenPair, RefreshError> {
        let response = self.post_refresh_token(REFRESH_ENDPOINT, refresh_token).await?;

        let tokens: AuthTokens =
            response.json().await.map_err(|e| RefreshError::InvalidResponse(e.to_string()))?;

        Ok(into_pair(tokens))
    }

    async fn revoke(&self, refresh_token: &RefreshToken) -> Result<(), RefreshError> {
        self.post_refresh_token(LOGOUT_ENDPOINT, refresh_token).await?;
        Ok(())
    }
}

/// Login, signup, OAuth completion and logout
pub struct AuthService {
    client: Arc<ApiClient>,
}

impl AuthService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    fn store(&self) -> &Arc<TokenStore> {
        self.client.token_store()
    }

    async fn start_session(&self, tokens: AuthTokens) -> Result<(), ApiError> {
        self.store()
            .set_session(into_pair(tokens))
            .await
            .map_err(|e| ApiError::Storage(e.to_string()))
    }

    /// Exchange email and password for a session
    ///
    /// # Errors
    ///
    /// Returns the mapped backend error (e.g. 401 for bad credentials) or a
    /// storage error if the tokens could not be persisted
    #[instrument(skip_all, fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &Credentials) -> Result<(), ApiError> {
        let tokens: AuthTokens = self.client.post(LOGIN_ENDPOINT, credentials).await?;
        self.start_session(tokens).await?;

        info!("Signed in");
        Ok(())
    }

    /// Create an account and start its session
    ///
    /// A 409 conflict (account already exists) is returned as is; callers
    /// decide whether to change the input and try again.
    ///
    /// # Errors
    ///
    /// Returns the mapped backend error or a storage error
    #[instrument(skip_all, fields(email = %request.email))]
    pub async fn signup(&self, request: &SignupRequest) -> Result<(), ApiError> {
        let tokens: AuthTokens = match self.client.post(SIGNUP_ENDPOINT, request).await {
            Ok(tokens) => tokens,
            Err(e) if e.is_conflict() => {
                warn!(messages = ?e.messages(), "Account already exists");
                return Err(e);
            }
            Err(e) => return Err(e),
        };
        self.start_session(tokens).await?;

        info!("Account created");
        Ok(())
    }

    /// Finish an OAuth redirect for `provider`
    ///
    /// # Errors
    ///
    /// Returns the mapped backend error or a storage error
    #[instrument(skip(self, callback))]
    pub async fn complete_oauth(
        &self,
        provider: &str,
        callback: &OAuthCallback,
    ) -> Result<(), ApiError> {
        let endpoint = format!("{OAUTH_CALLBACK_PREFIX}/{provider}/callback");
        let tokens: AuthTokens = self.client.post(&endpoint, callback).await?;
        self.start_session(tokens).await?;

        info!("Signed in with OAuth provider");
        Ok(())
    }

    /// End the session
    ///
    /// The backend is notified on a best-effort basis; local tokens are
    /// always cleared.
    ///
    /// # Errors
    ///
    /// Returns error only if the local tokens could not be removed
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.client.coordinator().sign_out().await.map_err(|e| ApiError::Storage(e.to_string()))
    }

    /// Whether an access token is stored
    pub async fn is_authenticated(&self) -> bool {
        self.store().get_token().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use estatedesk_common::auth::{RefreshCoordinator, TokenSlots};
    use estatedesk_common::testing::{MockCredentialStore, RecordingNavigator};
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn transport_for(server: &MockServer) -> HttpRefreshTransport {
        HttpRefreshTransport::new(HttpClient::new().unwrap(), format!("{}/api", server.uri()))
    }

    async fn service_for(server: &MockServer) -> (AuthService, MockCredentialStore) {
        let durable = MockCredentialStore::new();
        let store = Arc::new(TokenStore::new(Arc::new(durable.clone()), TokenSlots::default()));
        let coordinator = Arc::new(RefreshCoordinator::new(
            store,
            Arc::new(transport_for(server)),
            Arc::new(RecordingNavigator::new()),
        ));
        let client = ApiClient::builder()
            .base_url(format!("{}/api", server.uri()))
            .coordinator(coordinator)
            .build()
            .unwrap();

        (AuthService::new(Arc::new(client)), durable)
    }

    #[tokio::test]
    async fn refresh_posts_token_and_parses_pair() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .and(body_json(json!({"refreshToken": "r1"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"accessToken": "a2", "refreshToken": "r2"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let pair = transport_for(&server).refresh(&RefreshToken::from("r1")).await.unwrap();

        assert_eq!(pair, TokenPair::new("a2", "r2"));
    }

    #[tokio::test]
    async fn refresh_maps_non_success_to_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let result = transport_for(&server).refresh(&RefreshToken::from("r1")).await;

        assert_eq!(result, Err(RefreshError::Rejected { status: 403 }));
    }

    #[tokio::test]
    async fn refresh_with_malformed_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "a2"})))
            .mount(&server)
            .await;

        let result = transport_for(&server).refresh(&RefreshToken::from("r1")).await;

        assert!(matches!(result, Err(RefreshError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn login_stores_both_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/token"))
            .and(body_json(json!({"email": "me@example.com", "password": "pw"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"accessToken": "a1", "refreshToken": "r1"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (auth, durable) = service_for(&server).await;
        assert!(!auth.is_authenticated().await);

        auth.login(&Credentials::new("me@example.com", "pw")).await.unwrap();

        assert!(auth.is_authenticated().await);
        assert_eq!(durable.value("accessToken").as_deref(), Some("a1"));
        assert_eq!(durable.value("refreshToken").as_deref(), Some("r1"));
    }

    #[tokio::test]
    async fn signup_conflict_is_surfaced_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/signup"))
            .respond_with(
                ResponseTemplate::new(409)
                    .set_body_json(json!({"error": {"message": "Email already registered"}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (auth, _durable) = service_for(&server).await;
        let request = SignupRequest {
            email: "me@example.com".into(),
            password: "pw".into(),
            name: "Me".into(),
            company_name: None,
        };

        let err = auth.signup(&request).await.unwrap_err();

        assert!(err.is_conflict());
        assert_eq!(err.user_message(), "Email already registered");
        assert!(!auth.is_authenticated().await);
    }

    #[tokio::test]
    async fn oauth_callback_uses_provider_path() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/oauth/google/callback"))
            .and(body_json(json!({"code": "c1", "state": "s1"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"accessToken": "a1", "refreshToken": "r1"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (auth, _durable) = service_for(&server).await;
        let callback = OAuthCallback { code: "c1".into(), state: Some("s1".into()) };

        auth.complete_oauth("google", &callback).await.unwrap();

        assert!(auth.is_authenticated().await);
    }

    #[tokio::test]
    async fn logout_clears_tokens_even_when_backend_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/logout"))
            .and(body_json(json!({"refreshToken": "r1"})))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let (auth, durable) = service_for(&server).await;
        durable.insert("accessToken", "a1");
        durable.insert("refreshToken", "r1");

        auth.logout().await.unwrap();

        assert!(!auth.is_authenticated().await);
        assert!(durable.value("refreshToken").is_none());
    }
}
