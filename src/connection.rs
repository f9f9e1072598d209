//! Connection factory: wires credentials, token cache, and HTTP client into
//! an authenticated Partner Center session.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::auth::{AuthClient, TokenCache};
use crate::client::PartnerCenterClient;
use crate::config::{PartnerConfig, PartnerCredentials};
use crate::error::{PartnerError, PartnerResult};

/// An authenticated Partner Center session.
///
/// Holds the single shared `reqwest::Client` for the session and the token
/// cache that keeps the grant fresh across calls.
#[derive(Clone)]
pub struct PartnerConnection {
    client: PartnerCenterClient,
}

impl PartnerConnection {
    /// Establishes an app-only connection via the two-hop token exchange.
    ///
    /// The exchange runs eagerly so a misconfigured credential fails here
    /// rather than on the first API call.
    #[instrument(skip(credentials), fields(tenant = %config.tenant))]
    pub async fn connect(
        config: PartnerConfig,
        credentials: PartnerCredentials,
    ) -> PartnerResult<Self> {
        let (http_client, config) = build_http_client(config)?;
        let auth = AuthClient::new(config.clone(), credentials, http_client.clone());
        let cache = Arc::new(TokenCache::app_only(auth));

        cache.refresh().await?;
        info!("Established app-only Partner Center connection");

        Ok(Self {
            client: PartnerCenterClient::new(http_client, cache, config),
        })
    }

    /// Establishes an app+user connection via the password grant.
    #[instrument(skip(credentials, password), fields(tenant = %config.tenant, username))]
    pub async fn connect_as_user(
        config: PartnerConfig,
        credentials: PartnerCredentials,
        username: &str,
        password: SecretString,
    ) -> PartnerResult<Self> {
        let (http_client, config) = build_http_client(config)?;
        let auth = AuthClient::new(config.clone(), credentials, http_client.clone());
        let cache = Arc::new(TokenCache::user_password(
            auth,
            username.to_string(),
            password,
        ));

        cache.refresh().await?;
        info!("Established app+user Partner Center connection");

        Ok(Self {
            client: PartnerCenterClient::new(http_client, cache, config),
        })
    }

    /// The typed API client for this session.
    #[must_use]
    pub fn client(&self) -> &PartnerCenterClient {
        &self.client
    }

    /// Expiry of the currently held grant, if it carries one.
    pub async fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.client
            .token_cache()
            .current_grant()
            .await
            .and_then(|g| g.expires_at)
    }

    /// Discards the current grant and re-runs the exchange.
    pub async fn refresh(&self) -> PartnerResult<()> {
        self.client.token_cache().invalidate().await;
        self.client.token_cache().refresh().await?;
        Ok(())
    }

    /// Verifies the session with a minimal authenticated request.
    pub async fn test_connection(&self) -> PartnerResult<()> {
        self.client.list_customers(Some(1)).await.map(|_| ())
    }
}

/// Builds the session's single HTTP client from the configured timeout.
fn build_http_client(
    config: PartnerConfig,
) -> PartnerResult<(reqwest::Client, Arc<PartnerConfig>)> {
    let http_client = reqwest::Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(|e| PartnerError::Config(format!("Failed to create HTTP client: {e}")))?;
    Ok((http_client, Arc::new(config)))
}
