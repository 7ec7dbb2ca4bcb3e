use std::sync::Arc;

use estatedesk_common::auth::{RefreshCoordinator, TokenSlots, TokenStore};
use estatedesk_common::testing::MockCredentialStore;
use estatedesk_infra::api::{
    ApiClient, ApiClientConfig, BroadcastNavigator, HttpRefreshTransport,
};
use wiremock::MockServer;

/// Full request stack against one mock backend.
///
/// The refresh transport is the real HTTP binding, so `auth/refresh` calls
/// reach the same server as the API calls.
pub struct TestSession {
    pub server: MockServer,
    pub durable: MockCredentialStore,
    pub navigator: BroadcastNavigator,
    pub client: Arc<ApiClient>,
}

impl TestSession {
    /// Start a mock server and a client whose store holds `access`/`refresh`.
    pub async fn start(access: Option<&str>, refresh: Option<&str>) -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let server = MockServer::start().await;
        let durable = MockCredentialStore::new();
        if let Some(access) = access {
            durable.insert("accessToken", access);
        }
        if let Some(refresh) = refresh {
            durable.insert("refreshToken", refresh);
        }

        let config =
            ApiClientConfig { base_url: format!("{}/api", server.uri()), ..Default::default() };
        let navigator = BroadcastNavigator::default();
        let store = Arc::new(TokenStore::new(Arc::new(durable.clone()), TokenSlots::default()));
        let transport =
            HttpRefreshTransport::from_config(&config).expect("refresh transport should build");
        let coordinator = Arc::new(RefreshCoordinator::new(
            store,
            Arc::new(transport),
            Arc::new(navigator.clone()),
        ));
        let client = ApiClient::new(config, coordinator).expect("api client should build");

        Self { server, durable, navigator, client: Arc::new(client) }
    }

    /// Number of requests the mock server has seen for `path`.
    pub async fn calls_to(&self, path: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.url.path() == path)
            .count()
    }
}
