//! Application context - dependency injection container

use std::sync::Arc;

use estatedesk_common::auth::{CredentialStore, RefreshCoordinator, TokenSlots, TokenStore};
use estatedesk_common::security::KeychainProvider;
use estatedesk_domain::{Config, Result};
use estatedesk_infra::api::{
    ApiClient, ApiClientConfig, AuthService, BroadcastNavigator, HttpRefreshTransport,
    PropertiesApi, SessionEvent, UsersApi,
};
use tokio::sync::broadcast;
use tracing::info;

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub token_store: Arc<TokenStore>,
    pub coordinator: Arc<RefreshCoordinator>,
    pub api: Arc<ApiClient>,
    pub auth: Arc<AuthService>,
    pub properties: Arc<PropertiesApi>,
    pub users: Arc<UsersApi>,
    navigator: BroadcastNavigator,
}

impl AppContext {
    /// Build the context with tokens kept in the platform keychain
    ///
    /// # Errors
    /// Returns error if an HTTP client can not be constructed
    pub fn new(config: Config) -> Result<Self> {
        let keychain = KeychainProvider::new(config.session.keychain_service.clone());
        Self::with_store(config, Arc::new(keychain))
    }

    /// Build the context over an arbitrary durable store
    ///
    /// # Errors
    /// Returns error if an HTTP client can not be constructed
    pub fn with_store(config: Config, durable: Arc<dyn CredentialStore>) -> Result<Self> {
        let slots = TokenSlots::new(
            config.session.access_token_key.clone(),
            config.session.refresh_token_key.clone(),
        );
        let token_store = Arc::new(TokenStore::new(durable, slots));

        let client_config = ApiClientConfig::from(config.api.clone());
        let transport = HttpRefreshTransport::from_config(&client_config)?;
        let navigator = BroadcastNavigator::default();

        let coordinator = Arc::new(RefreshCoordinator::new(
            Arc::clone(&token_store),
            Arc::new(transport),
            Arc::new(navigator.clone()),
        ));
        let api = Arc::new(ApiClient::new(client_config, Arc::clone(&coordinator))?);

        info!(base_url = %config.api.base_url, "Application context initialised");

        Ok(Self {
            auth: Arc::new(AuthService::new(Arc::clone(&api))),
            properties: Arc::new(PropertiesApi::new(Arc::clone(&api))),
            users: Arc::new(UsersApi::new(Arc::clone(&api))),
            config,
            token_store,
            coordinator,
            api,
            navigator,
        })
    }

    /// Subscribe to session lifecycle events (sign-in redirects)
    pub fn session_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.navigator.subscribe()
    }
}
