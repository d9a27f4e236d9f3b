//! Integration tests for the bearer guard

use super::*;
use authorization_client::{BearerGuard, PermissionMapping};
use serde_json::json;
use wiremock::matchers::{body_json, query_param};
use wiremock::ResponseTemplate;

async fn mount_user(mock_server: &MockServer, credential: &str, username: &str) {
    mock_with_bearer("GET", "/v1/user/details", credential)
        .and(query_param("includePermissions", "true"))
        .respond_with(success_response(json!({
            "permissionsIncluded": false,
            "username": username
        })))
        .mount(mock_server)
        .await;

    mock_with_bearer("GET", "/v1/user/details", credential)
        .respond_with(success_response(json!({"permissionsIncluded": false})))
        .mount(mock_server)
        .await;
}

fn guard_for(mock_server: &MockServer) -> BearerGuard {
    let permissions = PermissionMapping::new()
        .path("/admin/**", "admin.access")
        .expect("Failed to compile pattern");
    BearerGuard::new(client_for(mock_server))
        .with_permissions(permissions)
        .ignore_path("/health")
        .expect("Failed to compile pattern")
}

#[tokio::test]
async fn test_guard_authenticates_mapped_path() {
    let mock_server = setup_mock_server().await;
    mount_user(&mock_server, "EXT", "alice").await;

    mock_with_bearer("POST", "/v1/user/checknode", "EXT")
        .and(body_json(json!({"node": "admin.access"})))
        .respond_with(success_response(json!({"state": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let guard = guard_for(&mock_server);
    let authentication = guard
        .authenticate(Some("Bearer EXT"), "/admin/users")
        .await
        .unwrap()
        .expect("request should be authenticated");

    assert_eq!(authentication.name(), Some("alice"));
}

#[tokio::test]
async fn test_guard_refuses_missing_node() {
    let mock_server = setup_mock_server().await;
    mount_user(&mock_server, "EXT", "bob").await;

    mock_with_bearer("POST", "/v1/user/checknode", "EXT")
        .respond_with(success_response(json!({"state": false})))
        .mount(&mock_server)
        .await;

    let guard = guard_for(&mock_server);
    let result = guard
        .authenticate(Some("Bearer EXT"), "/admin/users")
        .await
        .unwrap();

    assert!(result.is_none());
}

#[tokio::test]
async fn test_guard_skips_node_checks_for_unmapped_path() {
    let mock_server = setup_mock_server().await;
    mount_user(&mock_server, "EXT", "carol").await;

    mock_with_bearer("POST", "/v1/user/checknode", "EXT")
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;

    let guard = guard_for(&mock_server);
    let authentication = guard
        .authenticate(Some("Bearer EXT"), "/profile")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(authentication.details.username.as_deref(), Some("carol"));
    assert!(!guard.requires_authentication("/health"));
}

#[tokio::test]
async fn test_guard_rejects_unknown_credential() {
    let mock_server = setup_mock_server().await;

    let guard = guard_for(&mock_server);
    assert!(guard
        .authenticate(Some("Bearer unknown"), "/profile")
        .await
        .unwrap()
        .is_none());
    assert!(guard
        .authenticate(Some("Token unknown"), "/profile")
        .await
        .unwrap()
        .is_none());
}
