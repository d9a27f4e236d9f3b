//! Integration tests using WireMock
//!
//! These tests drive the reqwest transport and the V1 strategy against a
//! mock authorization server, covering the full request/response cycle of
//! sessions and the bearer guard.

mod guard;
mod session_flow;

use authorization_client::{client_config, AuthorizationClient};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockBuilder, MockServer, ResponseTemplate};

/// Helper to create a mock authorization server
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Helper to create a client pointing at the mock server
pub fn client_for(server: &MockServer) -> AuthorizationClient {
    let config = client_config()
        .url(server.uri())
        .build()
        .expect("Failed to build config");
    AuthorizationClient::new(config).expect("Failed to build client")
}

/// Token response body expiring `offset_ms` from now
pub fn token_body(token: &str, refresh_token: Option<&str>, offset_ms: i64) -> Value {
    json!({
        "token": token,
        "refreshToken": refresh_token,
        "expiresAt": (Utc::now() + Duration::milliseconds(offset_ms)).timestamp_millis(),
    })
}

/// Helper to match a request carrying the given bearer credential
pub fn mock_with_bearer(method_matcher: &str, path_matcher: &str, credential: &str) -> MockBuilder {
    Mock::given(method(method_matcher))
        .and(path(path_matcher))
        .and(header("authorization", format!("Bearer {}", credential).as_str()))
}

/// Helper to create success response templates
pub fn success_response(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}
