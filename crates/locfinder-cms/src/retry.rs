//! Retry policy for CMS requests.
//!
//! Rate limiting (429), request timeouts (408), 5xx responses and transport
//! timeouts or connect failures are retried. A missing page or an
//! undecodable body is final.

use std::future::Future;
use std::time::Duration;

use crate::error::CmsError;

const MAX_DELAY: Duration = Duration::from_secs(10);
const JITTER_MIN: f64 = 0.75;
const JITTER_MAX: f64 = 1.25;

/// Exponential back-off settings for one client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    pub(crate) fn new(max_retries: u32, backoff_base_ms: u64) -> Self {
        Self {
            max_retries,
            base_delay: Duration::from_millis(backoff_base_ms),
        }
    }

    /// Delay before the `retry`-th retry (1-based), scaled by `jitter`.
    ///
    /// Doubles per retry from the base delay, capped at 10 s before jitter.
    /// `jitter` is clamped to `0.75..=1.25`.
    pub(crate) fn delay(&self, retry: u32, jitter: f64) -> Duration {
        let doublings = retry.saturating_sub(1).min(10);
        let backoff = self
            .base_delay
            .saturating_mul(1 << doublings)
            .min(MAX_DELAY);
        backoff.mul_f64(jitter.clamp(JITTER_MIN, JITTER_MAX))
    }
}

/// Whether `err` is worth another attempt.
pub(crate) fn is_retriable(err: &CmsError) -> bool {
    match err {
        CmsError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        CmsError::UnexpectedStatus { status, .. } => {
            matches!(status, 408 | 429) || *status >= 500
        }
        CmsError::NotFound { .. }
        | CmsError::Deserialize { .. }
        | CmsError::InvalidBaseUrl { .. } => false,
    }
}

/// Runs `request` until it succeeds, fails for good, or `policy` runs out.
///
/// `endpoint` names the content being fetched in log events.
pub(crate) async fn with_retries<T, F, Fut>(
    policy: RetryPolicy,
    endpoint: &str,
    mut request: F,
) -> Result<T, CmsError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CmsError>>,
{
    let mut retry = 0u32;
    loop {
        let err = match request().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !is_retriable(&err) {
            return Err(err);
        }
        if retry >= policy.max_retries {
            if retry > 0 {
                tracing::warn!(endpoint, attempts = retry + 1, error = %err, "CMS request gave up");
            }
            return Err(err);
        }

        retry += 1;
        let delay = policy.delay(retry, rand::random_range(JITTER_MIN..=JITTER_MAX));
        tracing::warn!(
            endpoint,
            retry,
            max_retries = policy.max_retries,
            delay = ?delay,
            error = %err,
            "CMS request failed; retrying"
        );
        tokio::time::sleep(delay).await;
    }
}
