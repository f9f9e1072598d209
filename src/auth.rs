//! Azure AD OAuth2 token exchange for Partner Center.
//!
//! Partner Center uses a two-hop flow for app-only access: a standard
//! client-credentials grant against the tenant's Azure AD token endpoint
//! yields an AAD graph token, which is then presented as a bearer credential
//! to the Partner Center `generatetoken` endpoint (`grant_type=jwt_token`)
//! and exchanged for the Partner Center access token. App+user access uses
//! the resource-owner password grant directly.

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::config::{PartnerConfig, PartnerCredentials};
use crate::error::{PartnerError, PartnerResult};

/// Accepts `expires_in` as a JSON number or a numeric string; anything else
/// maps to `None` rather than a deserialization error.
pub(crate) fn lenient_expires_in<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }))
}

/// Token bundle returned by a successful exchange.
#[derive(Clone, Deserialize)]
pub struct AccessGrant {
    /// The access token itself.
    pub access_token: String,
    /// Token type, normally `Bearer`.
    #[serde(default)]
    pub token_type: Option<String>,
    /// Granted scope.
    #[serde(default)]
    pub scope: Option<String>,
    /// Refresh token, when the grant type yields one.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// OpenID Connect id token (password grant with `scope=openid`).
    #[serde(default)]
    pub id_token: Option<String>,
    /// Lifetime in seconds. Azure AD sometimes returns this as a string.
    #[serde(default, deserialize_with = "lenient_expires_in")]
    pub expires_in: Option<i64>,
    /// Absolute expiry, stamped when the grant is received.
    #[serde(skip)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessGrant {
    /// Stamps `expires_at` relative to now from `expires_in`.
    fn stamp_expiry(mut self) -> Self {
        self.expires_at = self.expires_in.map(|secs| Utc::now() + Duration::seconds(secs));
        self
    }

    /// Returns true if the grant expires within the grace period.
    ///
    /// A grant without an expiry never expires from the cache's point of
    /// view; callers refresh it only on a 401.
    #[must_use]
    pub fn is_expired(&self, grace_period: Duration) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() + grace_period >= expires_at,
            None => false,
        }
    }
}

impl std::fmt::Debug for AccessGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGrant")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("expires_in", &self.expires_in)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// First-hop Azure AD token response (graph resource).
#[derive(Debug, Deserialize)]
pub struct AzureAdToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_expires_in")]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub resource: Option<String>,
}

/// How the cache acquires a fresh grant.
#[derive(Clone)]
enum TokenSource {
    /// Two-hop client-credentials + jwt_token exchange.
    AppOnly,
    /// Resource-owner password grant.
    UserPassword {
        username: String,
        password: SecretString,
    },
}

/// Performs the raw OAuth2 exchanges against Azure AD and Partner Center.
#[derive(Clone)]
pub struct AuthClient {
    config: Arc<PartnerConfig>,
    credentials: PartnerCredentials,
    http_client: reqwest::Client,
}

impl AuthClient {
    /// Creates an auth client sharing the connection's HTTP client.
    #[must_use]
    pub fn new(
        config: Arc<PartnerConfig>,
        credentials: PartnerCredentials,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            config,
            credentials,
            http_client,
        }
    }

    /// First hop: client-credentials grant for an AAD graph token.
    #[instrument(skip(self), fields(tenant = %self.config.tenant))]
    pub async fn request_ad_token(&self) -> PartnerResult<AzureAdToken> {
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.credentials.application_id.as_str()),
            (
                "client_secret",
                self.credentials.application_secret.expose_secret(),
            ),
            ("resource", self.config.cloud.graph_resource()),
        ];

        let response = self
            .http_client
            .post(self.config.token_endpoint())
            .form(&params)
            .send()
            .await
            .map_err(|e| PartnerError::Auth(format!("AD token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PartnerError::Auth(format!(
                "AD token request failed with status {status}: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| PartnerError::Auth(format!("Failed to parse AD token response: {e}")))
    }

    /// Second hop: exchange an AAD token for a Partner Center grant.
    #[instrument(skip(self, ad_token))]
    pub async fn exchange_for_access(&self, ad_token: &str) -> PartnerResult<AccessGrant> {
        let params = [("grant_type", "jwt_token")];

        let response = self
            .http_client
            .post(self.config.generate_token_endpoint())
            .bearer_auth(ad_token)
            .form(&params)
            .send()
            .await
            .map_err(|e| PartnerError::Auth(format!("Token exchange failed: {e}")))?;

        self.parse_grant(response).await
    }

    /// Resource-owner password grant for app+user access.
    #[instrument(skip(self, password), fields(tenant = %self.config.tenant))]
    pub async fn exchange_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> PartnerResult<AccessGrant> {
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("username", username),
            ("password", password),
            ("resource", self.config.cloud.partner_api_endpoint()),
            ("scope", "openid"),
            ("grant_type", "password"),
        ];

        let response = self
            .http_client
            .post(self.config.token_endpoint())
            .form(&params)
            .send()
            .await
            .map_err(|e| PartnerError::Auth(format!("Password grant failed: {e}")))?;

        self.parse_grant(response).await
    }

    /// Full app-only exchange: AD hop, then the jwt_token hop.
    pub async fn acquire(&self) -> PartnerResult<AccessGrant> {
        let ad_token = self.request_ad_token().await?;
        self.exchange_for_access(&ad_token.access_token).await
    }

    async fn parse_grant(&self, response: reqwest::Response) -> PartnerResult<AccessGrant> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PartnerError::Auth(format!(
                "Token request failed with status {status}: {body}"
            )));
        }

        let grant: AccessGrant = response
            .json()
            .await
            .map_err(|e| PartnerError::Auth(format!("Failed to parse token response: {e}")))?;

        let grant = grant.stamp_expiry();
        debug!(expires_at = ?grant.expires_at, "Acquired Partner Center grant");
        Ok(grant)
    }
}

/// Caches the current grant and refreshes it before expiry.
pub struct TokenCache {
    auth: AuthClient,
    source: TokenSource,
    cached: Arc<RwLock<Option<AccessGrant>>>,
    /// Grace period before expiry to trigger refresh (default: 5 minutes).
    grace_period: Duration,
}

impl TokenCache {
    /// Cache for an app-only (two-hop) session.
    #[must_use]
    pub fn app_only(auth: AuthClient) -> Self {
        Self {
            auth,
            source: TokenSource::AppOnly,
            cached: Arc::new(RwLock::new(None)),
            grace_period: Duration::minutes(5),
        }
    }

    /// Cache for an app+user (password grant) session.
    #[must_use]
    pub fn user_password(auth: AuthClient, username: String, password: SecretString) -> Self {
        Self {
            auth,
            source: TokenSource::UserPassword { username, password },
            cached: Arc::new(RwLock::new(None)),
            grace_period: Duration::minutes(5),
        }
    }

    /// Gets a valid access token, refreshing if necessary.
    #[instrument(skip(self))]
    pub async fn get_token(&self) -> PartnerResult<String> {
        {
            let cache = self.cached.read().await;
            if let Some(ref grant) = *cache {
                if !grant.is_expired(self.grace_period) {
                    debug!("Using cached token");
                    return Ok(grant.access_token.clone());
                }
            }
        }

        debug!("Refreshing access grant");
        let grant = self.refresh().await?;
        Ok(grant.access_token)
    }

    /// Re-runs the exchange for this session's source and replaces the cache.
    pub async fn refresh(&self) -> PartnerResult<AccessGrant> {
        let grant = match &self.source {
            TokenSource::AppOnly => self.auth.acquire().await?,
            TokenSource::UserPassword { username, password } => {
                self.auth
                    .exchange_credentials(username, password.expose_secret())
                    .await?
            }
        };

        let mut cache = self.cached.write().await;
        *cache = Some(grant.clone());
        Ok(grant)
    }

    /// Returns the currently cached grant, if any.
    pub async fn current_grant(&self) -> Option<AccessGrant> {
        self.cached.read().await.clone()
    }

    /// Invalidates the cached grant, forcing a refresh on next use.
    pub async fn invalidate(&self) {
        let mut cache = self.cached.write().await;
        *cache = None;
    }
}
