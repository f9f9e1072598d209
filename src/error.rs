//! Error types for the Partner Center client.

use serde::Deserialize;
use thiserror::Error;

/// Result type alias using [`PartnerError`].
pub type PartnerResult<T> = Result<T, PartnerError>;

/// Errors that can occur when interacting with Partner Center.
#[derive(Debug, Error)]
pub enum PartnerError {
    /// Configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// `OAuth2` / Azure AD authentication error.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// A caller-supplied path identifier was empty.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Partner Center API fault (non-2xx with a fault document or raw body).
    ///
    /// The fault's own `source` field is named `fault_source` so thiserror
    /// does not treat it as an error cause.
    #[error("Partner Center API error ({status}): {description}")]
    ApiFault {
        status: u16,
        code: Option<String>,
        description: String,
        fault_source: Option<String>,
    },

    /// Resource not found (HTTP 404).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded (HTTP 429).
    #[error("Rate limit exceeded, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Maximum retry attempts exceeded.
    #[error("Maximum retries exceeded after {attempts} attempt(s): {message}")]
    MaxRetriesExceeded { attempts: u32, message: String },
}

/// Partner Center fault document returned on non-2xx responses.
///
/// The service is inconsistent about the `code` field type (sometimes a
/// number, sometimes a string), so it is normalized during deserialization.
#[derive(Debug, Deserialize)]
pub struct ApiFault {
    #[serde(default, deserialize_with = "lenient_code")]
    pub code: Option<String>,
    pub description: String,
    #[serde(default)]
    pub source: Option<String>,
}

impl ApiFault {
    /// Converts a response status and body into a typed error, falling back
    /// to the raw body when it is not a fault document.
    pub(crate) fn into_error(status: reqwest::StatusCode, body: String) -> PartnerError {
        match serde_json::from_str::<ApiFault>(&body) {
            Ok(fault) => PartnerError::ApiFault {
                status: status.as_u16(),
                code: fault.code,
                description: fault.description,
                fault_source: fault.source,
            },
            Err(_) => PartnerError::ApiFault {
                status: status.as_u16(),
                code: None,
                description: if body.is_empty() {
                    format!("HTTP {status}")
                } else {
                    body
                },
                fault_source: None,
            },
        }
    }
}

/// Accepts the fault `code` as either a JSON number or a string.
fn lenient_code<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }))
}
