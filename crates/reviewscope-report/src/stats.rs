//! Rating statistics over normalized reviews.

use reviewscope_core::{NormalizedReview, RatingDistribution};

use crate::error::ReportError;

/// Review count and per-star distribution for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RatingStats {
    pub total: u64,
    pub distribution: RatingDistribution,
    rating_sum: u64,
}

impl RatingStats {
    /// Mean star rating.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::EmptyInput`] when there are no reviews, since
    /// the mean of an empty set is undefined.
    pub fn average_rating(&self) -> Result<f64, ReportError> {
        if self.total == 0 {
            return Err(ReportError::EmptyInput);
        }
        #[allow(clippy::cast_precision_loss)]
        let mean = self.rating_sum as f64 / self.total as f64;
        Ok(mean)
    }
}

/// Single pass over `reviews`, counting each star rating.
///
/// # Errors
///
/// Returns [`ReportError::Validation`] if a review carries a rating outside
/// `1..=5`, which can only happen when a [`NormalizedReview`] was built by
/// hand rather than through normalization.
pub fn aggregate(reviews: &[NormalizedReview]) -> Result<RatingStats, ReportError> {
    let mut stats = RatingStats::default();
    for review in reviews {
        if !stats.distribution.record(review.rating) {
            return Err(ReportError::Validation {
                review_id: review.review_id.clone(),
                reason: format!("rating {} is outside 1..=5", review.rating),
            });
        }
        stats.total += 1;
        stats.rating_sum += u64::from(review.rating);
    }
    Ok(stats)
}
