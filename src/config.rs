//! Configuration for a Partner Center connection.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{PartnerError, PartnerResult};
use crate::retry::RetryPolicy;

/// Microsoft cloud environment hosting the Partner Center and login endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloudEnvironment {
    /// Global (commercial) cloud.
    Global,
    /// US Government cloud.
    UsGovernment,
    /// Germany sovereign cloud.
    Germany,
    /// China cloud (operated by 21Vianet).
    China,
}

impl CloudEnvironment {
    /// Azure AD login endpoint for the token request.
    #[must_use]
    pub fn login_endpoint(&self) -> &'static str {
        match self {
            Self::Global => "https://login.microsoftonline.com",
            Self::UsGovernment => "https://login.microsoftonline.us",
            Self::Germany => "https://login.microsoftonline.de",
            Self::China => "https://login.chinacloudapi.cn",
        }
    }

    /// Partner Center API endpoint.
    #[must_use]
    pub fn partner_api_endpoint(&self) -> &'static str {
        match self {
            Self::Global => "https://api.partnercenter.microsoft.com",
            Self::UsGovernment => "https://api.partnercenter.microsoftonline.us",
            Self::Germany => "https://api.partnercenter.microsoft.de",
            Self::China => "https://api.partnercenter.azure.cn",
        }
    }

    /// AAD graph resource URI used as the `resource` field of the
    /// client-credentials hop.
    #[must_use]
    pub fn graph_resource(&self) -> &'static str {
        match self {
            Self::Global => "https://graph.windows.net",
            Self::UsGovernment => "https://graph.windows.net",
            Self::Germany => "https://graph.cloudapi.de",
            Self::China => "https://graph.chinacloudapi.cn",
        }
    }
}

/// Azure AD application credentials for Partner Center access.
///
/// The [`Debug`] impl redacts the application secret to prevent accidental
/// credential exposure in log output.
#[derive(Clone)]
pub struct PartnerCredentials {
    /// Azure AD application (native app) id used for the token exchange.
    pub application_id: String,
    /// Application secret.
    pub application_secret: SecretString,
    /// Client id used for the password grant.
    pub client_id: String,
}

impl std::fmt::Debug for PartnerCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartnerCredentials")
            .field("application_id", &self.application_id)
            .field("application_secret", &"[REDACTED]")
            .field("client_id", &self.client_id)
            .finish()
    }
}

/// Connection configuration for Partner Center.
#[derive(Debug, Clone)]
pub struct PartnerConfig {
    /// Azure AD tenant: the reseller domain or tenant id.
    pub tenant: String,
    /// Partner Center API version segment (default: `v1`).
    pub api_version: String,
    /// Cloud environment.
    pub cloud: CloudEnvironment,
    /// HTTP request timeout.
    pub timeout: Duration,
    /// Retry policy for transient failures.
    pub retry: RetryPolicy,
    /// Override for the login endpoint (tests).
    pub login_endpoint_override: Option<String>,
    /// Override for the Partner Center API endpoint (tests).
    pub api_endpoint_override: Option<String>,
}

impl PartnerConfig {
    /// Start building a configuration for the given tenant.
    pub fn builder(tenant: impl Into<String>) -> PartnerConfigBuilder {
        PartnerConfigBuilder {
            tenant: tenant.into(),
            api_version: "v1".to_string(),
            cloud: CloudEnvironment::Global,
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            login_endpoint_override: None,
            api_endpoint_override: None,
        }
    }

    /// Resolved login endpoint.
    #[must_use]
    pub fn login_endpoint(&self) -> String {
        self.login_endpoint_override
            .clone()
            .unwrap_or_else(|| self.cloud.login_endpoint().to_string())
    }

    /// Resolved Partner Center API endpoint.
    #[must_use]
    pub fn api_endpoint(&self) -> String {
        self.api_endpoint_override
            .clone()
            .unwrap_or_else(|| self.cloud.partner_api_endpoint().to_string())
    }

    /// Azure AD token endpoint for this tenant.
    #[must_use]
    pub fn token_endpoint(&self) -> String {
        format!("{}/{}/oauth2/token", self.login_endpoint(), self.tenant)
    }

    /// Partner Center `generatetoken` endpoint for the jwt_token hop.
    #[must_use]
    pub fn generate_token_endpoint(&self) -> String {
        format!("{}/generatetoken", self.api_endpoint())
    }
}

/// Builder for [`PartnerConfig`].
#[derive(Debug, Clone)]
pub struct PartnerConfigBuilder {
    tenant: String,
    api_version: String,
    cloud: CloudEnvironment,
    timeout: Duration,
    retry: RetryPolicy,
    login_endpoint_override: Option<String>,
    api_endpoint_override: Option<String>,
}

impl PartnerConfigBuilder {
    /// Sets the API version segment (e.g. `v1`).
    #[must_use]
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Sets the cloud environment.
    #[must_use]
    pub fn cloud(mut self, cloud: CloudEnvironment) -> Self {
        self.cloud = cloud;
        self
    }

    /// Sets the HTTP request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Points the login endpoint at an arbitrary base URL (tests).
    #[must_use]
    pub fn login_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.login_endpoint_override = Some(trim_trailing_slash(endpoint.into()));
        self
    }

    /// Points the Partner Center API at an arbitrary base URL (tests).
    #[must_use]
    pub fn api_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.api_endpoint_override = Some(trim_trailing_slash(endpoint.into()));
        self
    }

    /// Validates and builds the configuration.
    pub fn build(self) -> PartnerResult<PartnerConfig> {
        if self.tenant.trim().is_empty() {
            return Err(PartnerError::Config("tenant must not be empty".into()));
        }
        if self.api_version.trim().is_empty() {
            return Err(PartnerError::Config(
                "api_version must not be empty".into(),
            ));
        }
        for endpoint in [&self.login_endpoint_override, &self.api_endpoint_override]
            .into_iter()
            .flatten()
        {
            url::Url::parse(endpoint)?;
        }

        Ok(PartnerConfig {
            tenant: self.tenant,
            api_version: self.api_version,
            cloud: self.cloud,
            timeout: self.timeout,
            retry: self.retry,
            login_endpoint_override: self.login_endpoint_override,
            api_endpoint_override: self.api_endpoint_override,
        })
    }
}

fn trim_trailing_slash(s: String) -> String {
    s.trim_end_matches('/').to_string()
}
