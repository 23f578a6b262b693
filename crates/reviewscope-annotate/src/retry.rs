//! Retry with exponential back-off and jitter for annotation calls.
//!
//! Only transient failures are retried: timeouts, provider rate limits,
//! network errors and 5xx responses. A malformed response or a 4xx is
//! returned immediately because asking again will not change the answer.

use std::future::Future;
use std::time::Duration;

use crate::error::AnnotationError;

/// Upper bound on a single back-off sleep.
const MAX_DELAY_MS: u64 = 30_000;

/// Returns `true` for errors that are worth retrying after a back-off delay.
pub(crate) fn is_retriable(err: &AnnotationError) -> bool {
    match err {
        AnnotationError::Timeout(_) | AnnotationError::RateLimited { .. } => true,
        AnnotationError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        AnnotationError::UnexpectedStatus { status } => *status >= 500,
        AnnotationError::MalformedResponse(_) | AnnotationError::Provider(_) => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// The wait before retry `n` is `backoff_base_ms × 2^(n-1)` scaled by a random
/// factor in `[0.75, 1.25)`, capped at 30 s. A provider-supplied
/// `retry-after` is honoured when it is longer than the computed delay.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, AnnotationError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AnnotationError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let mut delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                if let AnnotationError::RateLimited {
                    retry_after_secs: Some(secs),
                } = &err
                {
                    delay_ms = delay_ms.max(secs.saturating_mul(1000).min(MAX_DELAY_MS));
                }
                tracing::debug!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient annotation error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
