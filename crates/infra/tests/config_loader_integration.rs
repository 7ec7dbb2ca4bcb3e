//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

use std::io::Write;

use estatedesk_infra::api::ApiClientConfig;
use estatedesk_infra::config;
use tempfile::NamedTempFile;

#[test]
fn test_load_config_from_json_file() {
    let json_content = r#"{
        "api": {
            "base_url": "https://desk.example.com/api",
            "timeout_seconds": 10,
            "user_agent": "estatedesk-integration/1.0"
        },
        "session": {
            "keychain_service": "EstateDesk.integration"
        },
        "logging": {
            "level": "debug",
            "json": true
        }
    }"#;

    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file.write_all(json_content.as_bytes()).expect("Failed to write to temp file");

    let path = temp_file.path().with_extension("json");
    std::fs::copy(temp_file.path(), &path).expect("Failed to copy file");

    let config = config::load_from_file(Some(path.clone())).expect("config should load");

    assert_eq!(config.api.base_url, "https://desk.example.com/api");
    assert_eq!(config.session.keychain_service, "EstateDesk.integration");
    assert_eq!(config.session.access_token_key, "accessToken");
    assert!(config.logging.json);

    let client_config = ApiClientConfig::from(config.api);
    assert_eq!(client_config.timeout, std::time::Duration::from_secs(10));
    assert_eq!(client_config.user_agent.as_deref(), Some("estatedesk-integration/1.0"));

    std::fs::remove_file(path).ok();
}

#[test]
fn test_load_config_from_toml_file() {
    let toml_content = r#"
[api]
base_url = "https://desk.example.com/api"
timeout_seconds = 0
"#;

    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file.write_all(toml_content.as_bytes()).expect("Failed to write to temp file");

    let path = temp_file.path().with_extension("toml");
    std::fs::copy(temp_file.path(), &path).expect("Failed to copy file");

    let config = config::load_from_file(Some(path.clone())).expect("config should load");

    // A zero timeout falls back to the default instead of disabling requests
    let client_config = ApiClientConfig::from(config.api);
    assert_eq!(client_config.timeout, std::time::Duration::from_secs(30));

    std::fs::remove_file(path).ok();
}
