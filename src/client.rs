//! Partner Center HTTP client with token injection and retry handling.

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::auth::TokenCache;
use crate::config::PartnerConfig;
use crate::error::{ApiFault, PartnerError, PartnerResult};

/// Request-tracing headers expected by Partner Center.
const MS_REQUEST_ID: &str = "MS-RequestId";
const MS_CORRELATION_ID: &str = "MS-CorrelationId";

/// Typed HTTP client for the Partner Center REST API.
///
/// Cheap to clone; the underlying `reqwest::Client`, token cache, and
/// configuration are shared. Exactly one `reqwest::Client` exists per
/// connection regardless of call order.
#[derive(Clone)]
pub struct PartnerCenterClient {
    http_client: reqwest::Client,
    token_cache: Arc<TokenCache>,
    config: Arc<PartnerConfig>,
    base_url: String,
}

impl PartnerCenterClient {
    /// Creates a client from an established token cache.
    #[must_use]
    pub fn new(
        http_client: reqwest::Client,
        token_cache: Arc<TokenCache>,
        config: Arc<PartnerConfig>,
    ) -> Self {
        let base_url = format!("{}/{}", config.api_endpoint(), config.api_version);
        Self {
            http_client,
            token_cache,
            config,
            base_url,
        }
    }

    /// Base URL for API requests (`{endpoint}/{api_version}`).
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The token cache backing this client.
    #[must_use]
    pub fn token_cache(&self) -> &Arc<TokenCache> {
        &self.token_cache
    }

    /// Joins the base URL with path segments, rejecting empty identifiers
    /// before any I/O.
    ///
    /// Each segment is percent-encoded, so a caller-supplied identifier
    /// containing `/`, `?`, or whitespace cannot address a different
    /// resource.
    pub(crate) fn build_url(&self, segments: &[&str]) -> PartnerResult<String> {
        let mut url = url::Url::parse(&self.base_url)?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| PartnerError::Config(format!("invalid base URL: {}", self.base_url)))?;
            for segment in segments {
                if segment.trim().is_empty() {
                    return Err(PartnerError::InvalidArgument(
                        "path identifier must not be empty".into(),
                    ));
                }
                path.push(segment);
            }
        }
        Ok(url.into())
    }

    /// Performs a GET request against an absolute URL.
    #[instrument(skip(self))]
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> PartnerResult<T> {
        self.send(Method::GET, url, None::<&()>, &[]).await
    }

    /// GET with extra headers (continuation tokens from paging links).
    pub(crate) async fn get_with_headers<T: DeserializeOwned>(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> PartnerResult<T> {
        self.send(Method::GET, url, None::<&()>, headers).await
    }

    /// Performs a POST request with a JSON body.
    #[instrument(skip(self, body))]
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> PartnerResult<T> {
        self.send(Method::POST, url, Some(body), &[]).await
    }

    /// Performs a PATCH request with a JSON body.
    #[instrument(skip(self, body))]
    pub async fn patch<T: DeserializeOwned, B: Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> PartnerResult<T> {
        self.send(Method::PATCH, url, Some(body), &[]).await
    }

    /// Performs a DELETE request (no response body expected).
    #[instrument(skip(self))]
    pub async fn delete(&self, url: &str) -> PartnerResult<()> {
        let retry = self.config.retry.clone();
        retry
            .execute("DELETE", || async move {
                let response = self
                    .send_once(Method::DELETE, url, None::<&()>, &[])
                    .await?;
                let status = response.status();
                if status.is_success() {
                    Ok(())
                } else {
                    Err(self.error_for(response).await)
                }
            })
            .await
    }

    /// Sends a request under the retry policy and deserializes the response.
    async fn send<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
        extra_headers: &[(String, String)],
    ) -> PartnerResult<T> {
        let retry = self.config.retry.clone();
        let operation = method.as_str().to_string();
        retry
            .execute(&operation, || {
                let method = method.clone();
                async move {
                    let response = self.send_once(method, url, body, extra_headers).await?;
                    let status = response.status();
                    if status.is_success() {
                        let text = response.text().await?;
                        Ok(serde_json::from_str(&text)?)
                    } else {
                        Err(self.error_for(response).await)
                    }
                }
            })
            .await
    }

    /// Single attempt: token injection, tracing headers, dispatch.
    async fn send_once<B: Serialize>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
        extra_headers: &[(String, String)],
    ) -> PartnerResult<reqwest::Response> {
        let token = self.token_cache.get_token().await?;

        let mut request = self
            .http_client
            .request(method, url)
            .bearer_auth(&token)
            .header(MS_REQUEST_ID, Uuid::new_v4().to_string())
            .header(MS_CORRELATION_ID, Uuid::new_v4().to_string())
            .header("Accept", "application/json");

        for (name, value) in extra_headers {
            request = request.header(name, value);
        }

        if let Some(b) = body {
            request = request.json(b);
        }

        debug!(url, "Sending Partner Center request");
        Ok(request.send().await?)
    }

    /// Maps a non-2xx response to a typed error. A 401 invalidates the
    /// cached grant so the next call re-authenticates.
    async fn error_for(&self, response: reqwest::Response) -> PartnerError {
        let status = response.status();

        match status {
            StatusCode::UNAUTHORIZED => {
                self.token_cache.invalidate().await;
                let body = response.text().await.unwrap_or_default();
                PartnerError::Auth(format!("Authentication failed (401): {body}"))
            }
            StatusCode::NOT_FOUND => {
                let body = response.text().await.unwrap_or_default();
                PartnerError::NotFound(if body.is_empty() {
                    "resource not found".to_string()
                } else {
                    body
                })
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok());
                PartnerError::RateLimited {
                    retry_after_secs: retry_after,
                }
            }
            _ => {
                let body = response.text().await.unwrap_or_default();
                ApiFault::into_error(status, body)
            }
        }
    }
}
