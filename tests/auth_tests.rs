//! Integration tests for the Azure AD token exchange flows: the two-hop
//! app-only exchange, the password grant, token caching, and lenient
//! `expires_in` handling.

mod common;

use common::*;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use partner_center::{AuthClient, PartnerConnection, PartnerError};
use std::sync::Arc;

fn auth_client(server: &MockServer) -> AuthClient {
    AuthClient::new(
        Arc::new(test_config(server)),
        test_credentials(),
        reqwest::Client::new(),
    )
}

#[tokio::test]
async fn test_app_only_two_hop_exchange() {
    let server = MockServer::start().await;

    // First hop carries the client credentials and the graph resource.
    Mock::given(method("POST"))
        .and(path(format!("/{TENANT}/oauth2/token")))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_id=test-app-id"))
        .and(body_string_contains("client_secret=test-app-secret"))
        .and(body_string_contains(
            "resource=https%3A%2F%2Fgraph.windows.net",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "expires_in": "3599",
            "access_token": AD_TOKEN
        })))
        .expect(1)
        .mount(&server)
        .await;

    // Second hop presents the AD token as a bearer credential.
    Mock::given(method("POST"))
        .and(path("/generatetoken"))
        .and(header("Authorization", format!("Bearer {AD_TOKEN}")))
        .and(body_string_contains("grant_type=jwt_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "expires_in": 3600,
            "access_token": PC_TOKEN
        })))
        .expect(1)
        .mount(&server)
        .await;

    let grant = auth_client(&server).acquire().await.unwrap();
    assert_eq!(grant.access_token, PC_TOKEN);
    assert_eq!(grant.expires_in, Some(3600));
    assert!(grant.expires_at.is_some());
}

#[tokio::test]
async fn test_password_grant_request_shape() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/{TENANT}/oauth2/token")))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains("client_id=test-client-id"))
        .and(body_string_contains("username=admin%40contoso.com"))
        .and(body_string_contains("password=pw"))
        .and(body_string_contains("scope=openid"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "scope": "openid",
            "expires_in": 3600,
            "access_token": PC_TOKEN,
            "refresh_token": "refresh-123",
            "id_token": "id-456"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let grant = auth_client(&server)
        .exchange_credentials("admin@contoso.com", "pw")
        .await
        .unwrap();

    assert_eq!(grant.access_token, PC_TOKEN);
    assert_eq!(grant.refresh_token.as_deref(), Some("refresh-123"));
    assert_eq!(grant.id_token.as_deref(), Some("id-456"));
    assert_eq!(grant.scope.as_deref(), Some("openid"));
}

#[tokio::test]
async fn test_malformed_expires_in_is_tolerated() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/{TENANT}/oauth2/token")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "expires_in": "not-a-number",
            "access_token": PC_TOKEN
        })))
        .mount(&server)
        .await;

    let grant = auth_client(&server)
        .exchange_credentials("admin@contoso.com", "pw")
        .await
        .unwrap();

    assert_eq!(grant.access_token, PC_TOKEN);
    assert_eq!(grant.expires_in, None);
    assert!(grant.expires_at.is_none());
}

#[tokio::test]
async fn test_failed_first_hop_surfaces_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/{TENANT}/oauth2/token")))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_client",
            "error_description": "AADSTS7000215: Invalid client secret provided."
        })))
        .mount(&server)
        .await;

    let result = auth_client(&server).acquire().await;
    match result {
        Err(PartnerError::Auth(message)) => {
            assert!(message.contains("400"));
            assert!(message.contains("invalid_client"));
        }
        other => panic!("Expected Auth error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_connect_establishes_session_with_expiry() {
    let server = MockServer::start().await;
    let connection = connect(&server).await;

    assert!(connection.expires_at().await.is_some());
}

#[tokio::test]
async fn test_token_is_cached_across_calls() {
    let server = MockServer::start().await;

    mount_token_exchange(&server).await;

    Mock::given(method("GET"))
        .and(path("/v1/customers/c-1/orders/o-1"))
        .and(header("Authorization", format!("Bearer {PC_TOKEN}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(order_json("o-1", "c-1")))
        .expect(2)
        .mount(&server)
        .await;

    let connection = PartnerConnection::connect(test_config(&server), test_credentials())
        .await
        .unwrap();

    connection.client().get_order("c-1", "o-1").await.unwrap();
    connection.client().get_order("c-1", "o-1").await.unwrap();

    // Both API calls reused the grant acquired at connect time.
    let token_requests = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path().ends_with("/oauth2/token"))
        .count();
    assert_eq!(token_requests, 1);
}

#[tokio::test]
async fn test_401_invalidates_cached_grant() {
    let server = MockServer::start().await;

    mount_token_exchange(&server).await;

    Mock::given(method("GET"))
        .and(path("/v1/customers/c-1/orders/o-1"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/customers/c-1/orders/o-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(order_json("o-1", "c-1")))
        .mount(&server)
        .await;

    let connection = PartnerConnection::connect(test_config(&server), test_credentials())
        .await
        .unwrap();

    let first = connection.client().get_order("c-1", "o-1").await;
    assert!(matches!(first, Err(PartnerError::Auth(_))));

    // The next call re-runs the exchange and succeeds.
    let order = connection.client().get_order("c-1", "o-1").await.unwrap();
    assert_eq!(order.id.as_deref(), Some("o-1"));

    let exchange_count = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/generatetoken")
        .count();
    assert_eq!(exchange_count, 2);
}

#[tokio::test]
async fn test_refresh_rotates_grant() {
    let server = MockServer::start().await;
    let connection = connect(&server).await;

    let before = connection.expires_at().await.unwrap();
    connection.refresh().await.unwrap();
    let after = connection.expires_at().await.unwrap();

    assert!(after >= before);
}
