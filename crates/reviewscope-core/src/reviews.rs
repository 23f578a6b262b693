//! Review records as they enter the pipeline and as they leave normalization.
//!
//! ## Input shape
//!
//! [`RawReview`] and [`AppInfo`] mirror what the Play Store scraping
//! collaborator returns. Review fields use camelCase on the wire
//! (`reviewId`, `userName`, `replyContent`). `installs` is sometimes an exact
//! integer and sometimes a bucket string such as `"100,000,000+"`, so it is
//! modeled as an untagged enum.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store listing metadata for the app being analyzed.
///
/// Serialized with snake_case names. The scraper's camelCase names
/// (`appId`, `contentRating`, `genre`) are accepted as aliases, so a raw
/// listing dump deserializes directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppInfo {
    /// Play Store package id, e.g. `"com.nianticlabs.pokemongo"`.
    #[serde(alias = "appId")]
    pub app_id: String,
    pub title: String,
    #[serde(default)]
    pub developer: Option<String>,
    /// Store-wide average rating. Absent for unrated apps.
    #[serde(default)]
    pub score: Option<f64>,
    /// Store-wide review count as reported by the listing.
    #[serde(default)]
    pub reviews: Option<u64>,
    #[serde(default)]
    pub installs: Option<Installs>,
    #[serde(alias = "genre")]
    pub category: String,
    #[serde(default)]
    pub price: Option<f64>,
    /// Download size label, e.g. `"Varies with device"`.
    #[serde(default)]
    pub size: Option<String>,
    /// Last store update, as Unix seconds on the wire.
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub updated: Option<DateTime<Utc>>,
    #[serde(default, alias = "contentRating")]
    pub content_rating: Option<String>,
}

/// Install count: exact when the store exposes it, otherwise a bucket label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Installs {
    Exact(u64),
    Bucket(String),
}

/// A single review exactly as the scraping collaborator produced it.
///
/// `score` is unvalidated here; range checks happen during
/// normalization so a corrupt record is reported with its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReview {
    pub review_id: String,
    #[serde(default)]
    pub content: Option<String>,
    pub score: i32,
    pub at: DateTime<Utc>,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub reply_content: Option<String>,
}

/// A review with guaranteed content and a rating in `1..=5`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedReview {
    pub review_id: String,
    /// Review text; empty string when the reviewer left only a star rating.
    pub content: String,
    pub rating: u8,
    pub at: DateTime<Utc>,
    pub user_name: String,
    pub reply_content: Option<String>,
}

/// Categorical tone of a review.
///
/// `Unknown` is what the placeholder annotator emits and what any failed
/// annotation is downgraded to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
    Unknown,
}

impl SentimentLabel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sentiment and tag sets attached to exactly one [`NormalizedReview`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentAnnotation {
    /// Id of the [`NormalizedReview`] this annotation belongs to.
    pub review_id: String,
    pub label: SentimentLabel,
    /// Topic tags, de-duplicated, in the order the annotator produced them.
    pub topics: Vec<String>,
    pub issues: Vec<String>,
    pub praises: Vec<String>,
}

impl SentimentAnnotation {
    /// The annotation recorded when no analysis was performed or it failed.
    #[must_use]
    pub fn unknown(review_id: impl Into<String>) -> Self {
        Self {
            review_id: review_id.into(),
            label: SentimentLabel::Unknown,
            topics: Vec::new(),
            issues: Vec::new(),
            praises: Vec::new(),
        }
    }
}
