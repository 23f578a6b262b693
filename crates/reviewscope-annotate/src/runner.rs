//! Fan-out of annotation calls across a review batch.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use reviewscope_core::{NormalizedReview, ReportConfig, SentimentAnnotation};
use tokio_util::sync::CancellationToken;

use crate::annotator::Annotator;
use crate::error::{AnnotationError, Cancelled};
use crate::retry::retry_with_backoff;

/// Per-call policy for [`annotate_reviews`].
#[derive(Debug, Clone)]
pub struct AnnotateOptions {
    /// Limit for a single attempt; a slower call counts as a timeout.
    pub timeout: Duration,
    /// Maximum number of annotation calls in flight at once.
    pub max_concurrency: usize,
    /// Additional attempts after the first failure for transient errors.
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl AnnotateOptions {
    #[must_use]
    pub fn from_config(config: &ReportConfig) -> Self {
        Self {
            timeout: config.annotation_timeout,
            max_concurrency: config.annotation_max_concurrency,
            max_retries: config.annotation_max_retries,
            backoff_base_ms: config.annotation_backoff_base_ms,
        }
    }
}

impl Default for AnnotateOptions {
    fn default() -> Self {
        Self::from_config(&ReportConfig::default())
    }
}

/// Annotations for a batch, one per review in input order.
#[derive(Debug, Clone)]
pub struct AnnotationBatch {
    pub annotations: Vec<SentimentAnnotation>,
    /// How many reviews were downgraded to `unknown` after failing.
    pub failures: usize,
}

/// Annotate every review, never failing on an individual review.
///
/// Calls run with at most `options.max_concurrency` in flight. Each call gets
/// its own timeout and retry loop; whatever still fails is recorded as
/// `unknown` and counted in [`AnnotationBatch::failures`]. Results are written
/// into a slot per review position, so output order matches `reviews`.
///
/// # Errors
///
/// Returns [`Cancelled`] if `cancel` fires before the batch completes.
/// In-flight calls are dropped.
pub async fn annotate_reviews(
    annotator: &dyn Annotator,
    reviews: &[NormalizedReview],
    options: &AnnotateOptions,
    cancel: &CancellationToken,
) -> Result<AnnotationBatch, Cancelled> {
    if cancel.is_cancelled() {
        return Err(Cancelled);
    }

    let mut slots: Vec<Option<SentimentAnnotation>> = vec![None; reviews.len()];
    let mut failures = 0usize;
    let max_concurrent = options.max_concurrency.max(1);

    let mut results = stream::iter(reviews.iter().enumerate())
        .map(move |(idx, review)| async move {
            (idx, annotate_one(annotator, review, options).await)
        })
        .buffer_unordered(max_concurrent);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::warn!(
                    annotator = annotator.name(),
                    completed = slots.iter().filter(|s| s.is_some()).count(),
                    total = reviews.len(),
                    "annotation cancelled, abandoning in-flight calls"
                );
                return Err(Cancelled);
            }
            next = results.next() => {
                let Some((idx, outcome)) = next else { break };
                let review = &reviews[idx];
                let annotation = match outcome {
                    Ok(annotation) => annotation,
                    Err(err) => {
                        tracing::warn!(
                            annotator = annotator.name(),
                            review_id = %review.review_id,
                            error = %err,
                            "annotation failed, recording as unknown"
                        );
                        failures += 1;
                        SentimentAnnotation::unknown(review.review_id.clone())
                    }
                };
                slots[idx] = Some(annotation);
            }
        }
    }

    let annotations = slots
        .into_iter()
        .zip(reviews)
        .map(|(slot, review)| {
            slot.unwrap_or_else(|| SentimentAnnotation::unknown(review.review_id.clone()))
        })
        .collect();

    Ok(AnnotationBatch {
        annotations,
        failures,
    })
}

async fn annotate_one(
    annotator: &dyn Annotator,
    review: &NormalizedReview,
    options: &AnnotateOptions,
) -> Result<SentimentAnnotation, AnnotationError> {
    let timeout = options.timeout;
    let attempt = move || async move {
        match tokio::time::timeout(timeout, annotator.annotate(&review.content)).await {
            Ok(result) => result,
            Err(_) => Err(AnnotationError::Timeout(timeout)),
        }
    };
    let annotation =
        retry_with_backoff(options.max_retries, options.backoff_base_ms, attempt).await?;
    Ok(annotation.into_sentiment(&review.review_id))
}
