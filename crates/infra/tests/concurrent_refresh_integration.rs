//! Concurrent 401s must share one `auth/refresh` call.

#[path = "support.rs"]
mod support;

use std::time::Duration;

use futures::future::join_all;
use reqwest::Method;
use serde_json::json;
use support::TestSession;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_unauthorized_requests_share_one_refresh() {
    let session = TestSession::start(Some("t1"), Some("r1")).await;
    Mock::given(method("GET"))
        .and(path("/api/properties"))
        .and(header("Authorization", "Bearer t1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&session.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"accessToken": "t2", "refreshToken": "r2"}))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&session.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/properties"))
        .and(header("Authorization", "Bearer t2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"properties": []})))
        .expect(8)
        .mount(&session.server)
        .await;

    let requests = (0..8).map(|_| {
        let client = session.client.clone();
        tokio::spawn(async move { client.request("properties", None, Method::GET, None).await })
    });
    let results = join_all(requests).await;

    for result in results {
        assert_eq!(result.unwrap().unwrap(), json!({"properties": []}));
    }
    assert_eq!(session.calls_to("/api/auth/refresh").await, 1);
    assert_eq!(session.durable.value("refreshToken").as_deref(), Some("r2"));
}

#[tokio::test]
async fn concurrent_requests_share_one_failed_refresh() {
    let session = TestSession::start(Some("t1"), Some("r1")).await;
    let mut events = session.navigator.subscribe();
    Mock::given(method("GET"))
        .and(path("/api/properties"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&session.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(500).set_delay(Duration::from_millis(300)))
        .expect(1)
        .mount(&session.server)
        .await;

    let results = join_all(
        (0..5).map(|_| session.client.request("properties", None, Method::GET, None)),
    )
    .await;

    for result in results {
        assert!(result.unwrap_err().is_session_expired());
    }
    assert_eq!(session.calls_to("/api/auth/refresh").await, 1);
    assert!(events.try_recv().is_ok());
    assert!(events.try_recv().is_err());
}
