use async_trait::async_trait;
use reviewscope_core::{SentimentAnnotation, SentimentLabel};

use crate::error::AnnotationError;

/// What an annotator says about one piece of review text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub label: SentimentLabel,
    pub topics: Vec<String>,
    pub issues: Vec<String>,
    pub praises: Vec<String>,
}

impl Annotation {
    /// No opinion: `unknown` with empty tag sets.
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            label: SentimentLabel::Unknown,
            topics: Vec::new(),
            issues: Vec::new(),
            praises: Vec::new(),
        }
    }

    /// Attach this result to the review it was computed for.
    #[must_use]
    pub fn into_sentiment(self, review_id: &str) -> SentimentAnnotation {
        SentimentAnnotation {
            review_id: review_id.to_string(),
            label: self.label,
            topics: self.topics,
            issues: self.issues,
            praises: self.praises,
        }
    }
}

/// Capability `annotate(text) -> (label, tags)`.
///
/// Implementations must be deterministic for a given input when cached
/// (see [`crate::CachedAnnotator`]). Timeouts and retries are applied by the
/// runner, so an implementation only needs to report failures honestly.
#[async_trait]
pub trait Annotator: Send + Sync {
    /// Short name used in log fields.
    fn name(&self) -> &str;

    async fn annotate(&self, text: &str) -> Result<Annotation, AnnotationError>;
}

/// Default annotator. Performs no analysis at all.
///
/// Every input is labeled `unknown` with no tags. It exists so the pipeline
/// runs end to end without an analysis provider; its output carries no
/// information about the review.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderAnnotator;

#[async_trait]
impl Annotator for PlaceholderAnnotator {
    fn name(&self) -> &'static str {
        "placeholder"
    }

    async fn annotate(&self, _text: &str) -> Result<Annotation, AnnotationError> {
        Ok(Annotation::unknown())
    }
}
