//! Common test utilities

#![allow(dead_code)]

use serde_json::json;
use udnsrs::{ClientConfig, UltraApi};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a ClientConfig pointing to a wiremock server
pub fn test_config(server: &MockServer) -> ClientConfig {
    ClientConfig::new()
        .with_base_url(server.uri())
        .with_user_agent("udnsrs-test/0.1.0")
}

/// A client holding a token pair, built without touching the network
pub fn token_client(server: &MockServer, access: &str, refresh: Option<&str>) -> UltraApi {
    UltraApi::with_tokens(access, refresh.map(str::to_string), test_config(server))
        .expect("Failed to create client")
}

/// Mounts a refresh-grant handler that hands out `access`/`refresh`
pub async fn mount_refresh(server: &MockServer, access: &str, refresh: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path("/authorization/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": access,
            "refreshToken": refresh,
            "expiresIn": "3600",
            "tokenType": "Bearer"
        })))
        .expect(times)
        .mount(server)
        .await;
}
