//! Shared helpers for Partner Center integration tests.
//!
//! Tests point both the login endpoint and the Partner Center API at a
//! single wiremock server, mocking the token exchange hops alongside the
//! resource endpoints.

#![allow(dead_code)]

use std::time::Duration;

use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use partner_center::{PartnerConfig, PartnerConnection, PartnerCredentials, RetryPolicy};

pub const TENANT: &str = "test-tenant";
pub const AD_TOKEN: &str = "ad-graph-token";
pub const PC_TOKEN: &str = "partner-center-token";

/// Config pointing every endpoint at the mock server, with fast retries.
pub fn test_config(server: &MockServer) -> PartnerConfig {
    PartnerConfig::builder(TENANT)
        .login_endpoint(server.uri())
        .api_endpoint(server.uri())
        .retry(RetryPolicy::new(2, Duration::ZERO))
        .build()
        .unwrap()
}

pub fn test_credentials() -> PartnerCredentials {
    PartnerCredentials {
        application_id: "test-app-id".to_string(),
        application_secret: "test-app-secret".to_string().into(),
        client_id: "test-client-id".to_string(),
    }
}

/// Mounts both hops of the app-only exchange.
pub async fn mount_token_exchange(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(format!("/{TENANT}/oauth2/token")))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "expires_in": "3599",
            "resource": "https://graph.windows.net",
            "access_token": AD_TOKEN
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/generatetoken"))
        .and(header("Authorization", format!("Bearer {AD_TOKEN}")))
        .and(body_string_contains("grant_type=jwt_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "expires_in": 3600,
            "access_token": PC_TOKEN
        })))
        .mount(server)
        .await;
}

/// Mounts the exchange and establishes an app-only connection.
pub async fn connect(server: &MockServer) -> PartnerConnection {
    mount_token_exchange(server).await;
    PartnerConnection::connect(test_config(server), test_credentials())
        .await
        .expect("connection should be established against the mock server")
}

/// Fixture: an order document as Partner Center returns it.
pub fn order_json(order_id: &str, customer_id: &str) -> Value {
    json!({
        "id": order_id,
        "referenceCustomerId": customer_id,
        "billingCycle": "monthly",
        "lineItems": [
            {
                "lineItemNumber": 0,
                "offerId": "031C9E47-4802-4248-838E-778FB1D2CC05",
                "subscriptionId": "sub-1",
                "friendlyName": "new offer purchase",
                "quantity": 3
            }
        ],
        "creationDate": "2024-03-01T10:15:00Z",
        "status": "completed",
        "attributes": {"objectType": "Order"}
    })
}

/// Fixture: a customer document.
pub fn customer_json(customer_id: &str, domain: &str) -> Value {
    json!({
        "id": customer_id,
        "companyProfile": {
            "tenantId": customer_id,
            "domain": domain,
            "companyName": "Contoso"
        },
        "relationshipToPartner": "reseller",
        "attributes": {"objectType": "Customer"}
    })
}

/// Fixture: a customer user document.
pub fn user_json(user_id: &str, upn: &str) -> Value {
    json!({
        "id": user_id,
        "userPrincipalName": upn,
        "firstName": "Test",
        "lastName": "User",
        "displayName": "Test User",
        "state": "active",
        "attributes": {"objectType": "CustomerUser"}
    })
}

/// Fixture: wraps items in the Partner Center collection envelope.
pub fn collection_json(items: Vec<Value>, next: Option<(&str, &str)>) -> Value {
    let mut body = json!({
        "totalCount": items.len(),
        "items": items,
        "attributes": {"objectType": "Collection"}
    });
    if let Some((uri, continuation_token)) = next {
        body["links"] = json!({
            "next": {
                "uri": uri,
                "method": "GET",
                "headers": [
                    {"key": "MS-ContinuationToken", "value": continuation_token}
                ]
            }
        });
    }
    body
}

/// Fixture: a Partner Center fault document.
pub fn fault_json(code: u32, description: &str) -> Value {
    json!({
        "code": code,
        "description": description,
        "data": [],
        "source": "PartnerApiServiceFault"
    })
}
