use std::time::Duration;

use thiserror::Error;

/// Failure of a single annotation call.
///
/// None of these are fatal to a report run: the runner retries the
/// transient ones and downgrades the review to `unknown` otherwise.
#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("annotation timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by annotation provider")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("unexpected HTTP status {status} from annotation provider")]
    UnexpectedStatus { status: u16 },

    #[error("malformed annotation response: {0}")]
    MalformedResponse(String),

    #[error("annotation provider error: {0}")]
    Provider(String),
}

/// The run was cancelled before every review was annotated.
#[derive(Debug, Error)]
#[error("annotation cancelled")]
pub struct Cancelled;
