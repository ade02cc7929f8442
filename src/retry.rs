use crate::constants::{ApiStatus, DEFAULT_RETRY_LIMIT};
use crate::error::FlushError;
use crate::transport::{ApiResponse, BoxError};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// How often and how patiently a request is retried.
///
/// `retry_limit` counts retries after the first attempt, so the default of
/// 5 allows up to 6 requests per flush.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retry_limit: u32,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retry_limit: DEFAULT_RETRY_LIMIT,
            base_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Retry up to `retry_limit` times without waiting in between.
    pub fn immediate(retry_limit: u32) -> Self {
        Self {
            retry_limit,
            base_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.retry_limit.saturating_add(1)
    }

    /// Delay before retry number `retry` (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        let shift = retry.saturating_sub(1).min(16);
        self.base_backoff
            .saturating_mul(1u32 << shift)
            .min(self.max_backoff)
    }
}

/// What to do with the result of one attempt.
#[derive(Debug, PartialEq)]
pub(crate) enum Verdict {
    Accept(ApiResponse),
    Reject(String),
    Retry(String),
}

/// Only the two status sentinels are definitive; everything else,
/// transport errors included, is worth another attempt. A success body
/// only counts when the HTTP status, if known, is 2xx.
pub(crate) fn classify(result: Result<ApiResponse, BoxError>) -> Verdict {
    match result {
        Ok(resp) => match resp.status {
            ApiStatus::Success => match resp.http_status {
                Some(code) if !(200..300).contains(&code) => {
                    Verdict::Retry(format!("success status with HTTP status {code}"))
                }
                _ => Verdict::Accept(resp),
            },
            ApiStatus::BadParam => Verdict::Reject(
                resp.message
                    .unwrap_or_else(|| ApiStatus::BAD_PARAM.to_string()),
            ),
            ApiStatus::Other(ref status) => Verdict::Retry(
                resp.message
                    .clone()
                    .unwrap_or_else(|| format!("unexpected status {status}")),
            ),
        },
        Err(e) => Verdict::Retry(e.to_string()),
    }
}

/// Drive `attempt` until it yields a definitive answer or the policy runs out.
///
/// `attempt` receives the 1-based attempt number.
pub(crate) async fn send_with_retry<F, Fut>(
    policy: &RetryPolicy,
    mut attempt: F,
) -> Result<ApiResponse, FlushError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<ApiResponse, BoxError>>,
{
    let max_attempts = policy.max_attempts();
    let mut reason = String::new();

    for n in 1..=max_attempts {
        match classify(attempt(n).await) {
            Verdict::Accept(resp) => return Ok(resp),
            Verdict::Reject(message) => {
                return Err(FlushError::Rejected {
                    message,
                    attempts: n,
                });
            }
            Verdict::Retry(why) => {
                if n < max_attempts {
                    let delay = policy.backoff(n);
                    debug!(attempt = n, ?delay, reason = %why, "request not accepted, retrying");
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                } else {
                    warn!(attempts = n, reason = %why, "giving up on request");
                }
                reason = why;
            }
        }
    }

    Err(FlushError::Exhausted {
        reason,
        attempts: max_attempts,
    })
}
