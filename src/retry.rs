//! Backoff policy for throttled and transiently failing Partner Center calls.
//!
//! The service throttles with HTTP 429 and a `Retry-After` header; that
//! header wins over computed backoff. Connection/timeout failures and 5xx
//! faults back off exponentially from [`RetryPolicy::base_delay`].

use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{PartnerError, PartnerResult};

/// Governs how operations react to throttling and transient failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retry budget per operation (0 disables retries).
    pub max_retries: u32,
    /// First backoff delay; doubles on each subsequent attempt.
    pub base_delay: Duration,
    /// Upper bound on any single delay, including `Retry-After` values.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
        }
    }
}

/// An error the service may stop producing on its own: throttling, 5xx
/// faults, and connection-level failures. Everything else is deterministic
/// and retrying it would only repeat the answer.
fn is_transient(error: &PartnerError) -> bool {
    match error {
        PartnerError::RateLimited { .. } => true,
        PartnerError::ApiFault { status, .. } => *status >= 500,
        PartnerError::Http(e) => e.is_connect() || e.is_timeout(),
        _ => false,
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            ..Self::default()
        }
    }

    /// A policy that fails on the first error.
    #[must_use]
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Decides whether to retry after `error`, and with what delay.
    ///
    /// Returns `None` when the error is not transient or the budget is
    /// spent. A throttle response carrying `Retry-After` waits exactly as
    /// long as the service asked (capped at `max_delay`); anything else
    /// gets exponential backoff.
    #[must_use]
    pub fn backoff(&self, attempt: u32, error: &PartnerError) -> Option<Duration> {
        if attempt >= self.max_retries || !is_transient(error) {
            return None;
        }
        let delay = match error {
            PartnerError::RateLimited {
                retry_after_secs: Some(secs),
            } => Duration::from_secs(*secs),
            _ => self
                .base_delay
                .checked_mul(1u32 << attempt.min(31))
                .unwrap_or(self.max_delay),
        };
        Some(delay.min(self.max_delay))
    }

    /// Drives `call` to completion under this policy.
    ///
    /// Transient failures sleep and re-invoke the closure until the budget
    /// runs out, at which point the last failure is reported as
    /// [`PartnerError::MaxRetriesExceeded`]. Non-transient errors pass
    /// through untouched, as does the first error under a zero budget.
    pub async fn execute<F, Fut, T>(&self, operation: &str, mut call: F) -> PartnerResult<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = PartnerResult<T>>,
    {
        let mut attempt: u32 = 0;
        loop {
            let error = match call().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(operation, attempts = attempt + 1, "Succeeded after backoff");
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            let Some(delay) = self.backoff(attempt, &error) else {
                if attempt > 0 && is_transient(&error) {
                    warn!(
                        operation,
                        attempts = attempt + 1,
                        error = %error,
                        "Retry budget exhausted"
                    );
                    return Err(PartnerError::MaxRetriesExceeded {
                        attempts: attempt + 1,
                        message: format!(
                            "{operation} failed after {} attempt(s): {error}",
                            attempt + 1
                        ),
                    });
                }
                return Err(error);
            };

            debug!(
                operation,
                attempt = attempt + 1,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Backing off before retry"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
