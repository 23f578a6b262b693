//! The insight report and its aggregate building blocks.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::reviews::{AppInfo, SentimentLabel};

/// Lowest and highest star rating the store allows.
pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Review counts per star rating.
///
/// Always carries all five buckets; the chart renderer and report consumers
/// rely on fixed keys `"1"` through `"5"` even when a bucket is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    into = "BTreeMap<String, u64>",
    try_from = "BTreeMap<String, u64>"
)]
pub struct RatingDistribution {
    counts: [u64; 5],
}

impl RatingDistribution {
    /// Increments the bucket for `rating`.
    ///
    /// Returns `false` and leaves the distribution untouched when `rating`
    /// is outside `1..=5`.
    pub fn record(&mut self, rating: u8) -> bool {
        match Self::slot(rating) {
            Some(idx) => {
                self.counts[idx] += 1;
                true
            }
            None => false,
        }
    }

    /// Count for one star rating; `0` for ratings outside `1..=5`.
    #[must_use]
    pub fn count(&self, rating: u8) -> u64 {
        Self::slot(rating).map_or(0, |idx| self.counts[idx])
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// `(rating, count)` pairs from 1 star to 5 stars.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        (MIN_RATING..=MAX_RATING).zip(self.counts.iter().copied())
    }

    fn slot(rating: u8) -> Option<usize> {
        (MIN_RATING..=MAX_RATING)
            .contains(&rating)
            .then(|| usize::from(rating - MIN_RATING))
    }
}

impl From<RatingDistribution> for BTreeMap<String, u64> {
    fn from(dist: RatingDistribution) -> Self {
        dist.iter().map(|(r, c)| (r.to_string(), c)).collect()
    }
}

impl TryFrom<BTreeMap<String, u64>> for RatingDistribution {
    type Error = String;

    fn try_from(map: BTreeMap<String, u64>) -> Result<Self, Self::Error> {
        let mut dist = Self::default();
        for (key, count) in map {
            let rating: u8 = key
                .parse()
                .map_err(|_| format!("rating bucket \"{key}\" is not a number"))?;
            let idx = Self::slot(rating)
                .ok_or_else(|| format!("rating bucket {rating} is outside 1..=5"))?;
            dist.counts[idx] = count;
        }
        Ok(dist)
    }
}

/// A tag and how many reviews mentioned it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicCount {
    pub tag: String,
    pub count: u64,
}

/// Aggregated, serializable summary produced once per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightReport {
    pub app_info: AppInfo,
    pub total_reviews: u64,
    /// `true` when the run had zero reviews; statistics are all zero and
    /// `average_rating` is `null`.
    pub no_data: bool,
    pub average_rating: Option<f64>,
    pub rating_distribution: RatingDistribution,
    /// Label → count. Only labels observed in the run appear.
    pub sentiment_distribution: BTreeMap<SentimentLabel, u64>,
    /// Most frequent topic tags first; ties keep first-seen order.
    pub top_topics: Vec<TopicCount>,
    pub top_issues: Vec<TopicCount>,
    pub top_praises: Vec<TopicCount>,
    /// Reviews whose annotation failed or timed out and were recorded as `unknown`.
    pub annotation_failures: u64,
    pub generated_at: DateTime<Utc>,
}

impl InsightReport {
    /// Returns `true` when both distributions sum to `total_reviews`.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let sentiment_total: u64 = self.sentiment_distribution.values().sum();
        self.rating_distribution.total() == self.total_reviews
            && sentiment_total == self.total_reviews
    }
}
