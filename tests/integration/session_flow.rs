//! Integration tests for session lifecycles

use super::*;
use authorization_client::{AuthError, Principal, TransportError, UnauthorizedError};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_principal_session_checks_node() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/authenticate"))
        .and(body_json(json!({"username": "alice", "password": "secret"})))
        .respond_with(success_response(token_body("T1", Some("R1"), 60_000)))
        .expect(1)
        .mount(&mock_server)
        .await;

    mock_with_bearer("POST", "/v1/user/checknode", "T1")
        .and(body_json(json!({"node": "admin.fly"})))
        .respond_with(success_response(json!({"state": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let session = client.authorize_credentials("alice", "secret").await.unwrap();

    assert!(session.authorized());
    assert!(session.fetch_node_state("admin.fly").await.unwrap());
}

#[tokio::test]
async fn test_expired_token_is_refreshed_and_call_retried() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/authenticate"))
        .respond_with(success_response(token_body("T1", Some("R1"), -1_000)))
        .expect(1)
        .mount(&mock_server)
        .await;

    mock_with_bearer("POST", "/v1/user/checknode", "T1")
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/refresh"))
        .and(body_json(json!({"refreshToken": "R1"})))
        .respond_with(success_response(token_body("T2", Some("R2"), 60_000)))
        .expect(1)
        .mount(&mock_server)
        .await;

    mock_with_bearer("POST", "/v1/user/checknode", "T2")
        .respond_with(success_response(json!({"state": false})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let session = client
        .authorize(Principal::credentials("alice", "secret"))
        .await
        .unwrap();

    assert!(!session.fetch_node_state("admin.fly").await.unwrap());
    let token = session.token().unwrap();
    assert_eq!(token.credential(), "T2");
    assert_eq!(token.refresh_credential(), Some("R2"));
}

#[tokio::test]
async fn test_trusted_session_reauthorizes_without_principal() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/authenticate"))
        .respond_with(success_response(token_body("ADMIN", None, 60_000)))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let session = client.authorize_trusted().await.unwrap();
    assert!(session.is_trusted());

    session.refresh().await.unwrap();
    assert_eq!(session.valid_credential().await.unwrap(), "ADMIN");
}

#[tokio::test]
async fn test_verify_and_fetch_user_details() {
    let mock_server = setup_mock_server().await;

    // Verification omits the permission list
    mock_with_bearer("GET", "/v1/user/details", "EXT")
        .and(query_param("includePermissions", "true"))
        .respond_with(success_response(json!({
            "permissionsIncluded": true,
            "permissions": ["admin.fly", "user.read"],
            "uuid": "7f3c",
            "primaryGroup": "admins",
            "username": "alice"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    mock_with_bearer("GET", "/v1/user/details", "EXT")
        .respond_with(success_response(json!({"permissionsIncluded": false})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let session = client.verify("EXT", None).await.unwrap();
    assert!(session.authorized());
    assert!(!session.is_refreshable());

    let details = session.fetch_user_details().await.unwrap();
    assert_eq!(details.username.as_deref(), Some("alice"));
    assert_eq!(details.id.as_deref(), Some("7f3c"));
    assert_eq!(details.has_permission("admin.fly"), Some(true));
    assert_eq!(details.has_permission("admin.land"), Some(false));
}

#[tokio::test]
async fn test_verify_rejected_credential() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/v1/user/details"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let session = client.verify("forged", None).await.unwrap();

    assert!(!session.authorized());
    assert!(matches!(
        session.fetch_user_details().await,
        Err(AuthError::Unauthorized(UnauthorizedError::NoCredential))
    ));
}

#[tokio::test]
async fn test_verified_token_rejected_later_without_refresh() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/v1/user/details"))
        .respond_with(success_response(json!({"permissionsIncluded": false})))
        .mount(&mock_server)
        .await;

    mock_with_bearer("POST", "/v1/user/checknode", "EXT")
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let session = client.verify("EXT", None).await.unwrap();

    assert!(matches!(
        session.fetch_node_state("admin.fly").await,
        Err(AuthError::Unauthorized(UnauthorizedError::SessionExpired))
    ));
}

#[tokio::test]
async fn test_refresh_session_from_refresh_credential() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/refresh"))
        .and(body_json(json!({"refreshToken": "R1"})))
        .respond_with(success_response(token_body("T2", Some("R2"), 60_000)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let session = client.refresh("R1").await.unwrap();

    assert!(session.authorized());
    assert_eq!(session.valid_credential().await.unwrap(), "T2");
}

#[tokio::test]
async fn test_rejected_credentials_give_unauthorized_session() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/authenticate"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let session = client.authorize_credentials("alice", "wrong").await.unwrap();

    assert!(!session.authorized());
    assert!(session.valid_credential().await.is_err());
}

#[tokio::test]
async fn test_malformed_token_response_is_protocol_fault() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/authenticate"))
        .respond_with(success_response(json!({"refreshToken": "R1"})))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.authorize_trusted().await;

    assert!(matches!(result, Err(AuthError::Protocol(_))));
}

#[tokio::test]
async fn test_redirect_is_transport_fault() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/v1/auth/authenticate"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", "https://elsewhere.example.com"),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.authorize_trusted().await;

    assert!(matches!(
        result,
        Err(AuthError::Transport(TransportError::UnexpectedRedirect { .. }))
    ));
}

#[tokio::test]
async fn test_unreachable_server_is_transport_fault() {
    let config = client_config().url("http://127.0.0.1:1").build().unwrap();
    let client = AuthorizationClient::new(config).unwrap();

    let error = client.authorize_trusted().await.unwrap_err();
    assert!(error.is_transport_fault());
    assert!(!error.needs_reauth());
}
