//! Typed client for the Microsoft Partner Center REST API.
//!
//! Provides request/response objects and thin wrapper operations for
//! customers, orders, users, directory roles, and subscriptions, plus the
//! Azure AD `OAuth2` exchanges Partner Center requires:
//!
//! - App-only access via the two-hop flow (client-credentials grant for an
//!   AAD graph token, then a `jwt_token` exchange against `generatetoken`).
//! - App+user access via the resource-owner password grant.
//!
//! Grants are cached and refreshed before expiry; transient failures are
//! retried under a configurable policy.
//!
//! # Example
//!
//! ```no_run
//! use partner_center::{PartnerConfig, PartnerConnection, PartnerCredentials};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PartnerConfig::builder("contoso.onmicrosoft.com").build()?;
//! let credentials = PartnerCredentials {
//!     application_id: "your-app-id".to_string(),
//!     application_secret: "your-app-secret".to_string().into(),
//!     client_id: "your-client-id".to_string(),
//! };
//!
//! let connection = PartnerConnection::connect(config, credentials).await?;
//! let customers = connection.client().list_customers(Some(20)).await?;
//! for customer in &customers.items {
//!     println!("{:?}", customer.company_profile);
//! }
//! # Ok(())
//! # }
//! ```

mod auth;
mod client;
mod config;
mod connection;
mod customers;
mod error;
mod orders;
mod paging;
mod retry;
mod subscriptions;
mod users;

// Re-exports
pub use auth::{AccessGrant, AuthClient, AzureAdToken, TokenCache};
pub use client::PartnerCenterClient;
pub use config::{CloudEnvironment, PartnerConfig, PartnerConfigBuilder, PartnerCredentials};
pub use connection::PartnerConnection;
pub use error::{ApiFault, PartnerError, PartnerResult};
pub use orders::{BillingCycle, CreateOrderRequest, Order, OrderLineItem};
pub use paging::{KeyValuePair, Link, ResourceCollection, ResourceLinks};
pub use retry::RetryPolicy;
pub use subscriptions::{Subscription, SubscriptionStatus};
pub use users::{
    CreateUserRequest, CustomerUser, DirectoryRole, PasswordProfile, UpdateUserPasswordRequest,
    UserState,
};

pub use customers::{
    Address, BillingProfile, CompanyProfile, CreateCustomerRequest, Customer,
};
