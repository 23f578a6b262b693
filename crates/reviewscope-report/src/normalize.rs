//! Conversion from scraper-shaped [`RawReview`] to [`NormalizedReview`].

use std::collections::HashSet;

use reviewscope_core::report::{MAX_RATING, MIN_RATING};
use reviewscope_core::{NormalizedReview, RawReview};

use crate::error::ReportError;

/// Normalizes one review.
///
/// Missing content becomes an empty string. Ratings are never clamped: a
/// score outside `1..=5` means the input is corrupt and is reported with the
/// review id.
///
/// # Errors
///
/// Returns [`ReportError::Validation`] if the rating is outside `1..=5`.
pub fn normalize_review(raw: &RawReview) -> Result<NormalizedReview, ReportError> {
    let rating = u8::try_from(raw.score)
        .ok()
        .filter(|r| (MIN_RATING..=MAX_RATING).contains(r))
        .ok_or_else(|| ReportError::Validation {
            review_id: raw.review_id.clone(),
            reason: format!(
                "rating {} is outside {MIN_RATING}..={MAX_RATING}",
                raw.score
            ),
        })?;

    Ok(NormalizedReview {
        review_id: raw.review_id.clone(),
        content: raw.content.clone().unwrap_or_default(),
        rating,
        at: raw.at,
        user_name: raw.user_name.clone(),
        reply_content: raw.reply_content.clone(),
    })
}

/// Normalizes a batch, preserving length and order.
///
/// Review ids must be unique within a batch, since annotations are joined
/// back to reviews by id.
///
/// # Errors
///
/// Returns the [`ReportError::Validation`] for the first review that has an
/// invalid rating or repeats an earlier id.
pub fn normalize_reviews(raw: &[RawReview]) -> Result<Vec<NormalizedReview>, ReportError> {
    let mut seen = HashSet::with_capacity(raw.len());
    raw.iter()
        .map(|review| {
            if !seen.insert(review.review_id.as_str()) {
                return Err(ReportError::Validation {
                    review_id: review.review_id.clone(),
                    reason: "duplicate review id".to_owned(),
                });
            }
            normalize_review(review)
        })
        .collect()
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
