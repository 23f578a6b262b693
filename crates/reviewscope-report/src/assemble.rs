//! Joins statistics and annotations into an [`InsightReport`].

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};
use reviewscope_core::{
    AppInfo, InsightReport, NormalizedReview, SentimentAnnotation, SentimentLabel, TopicCount,
};

use crate::stats::RatingStats;

/// Build the report for one run.
///
/// Annotations are matched to reviews by `review_id`; a review without a
/// matching annotation is counted as `unknown`, so the sentiment counts
/// always sum to the number of reviews. Tag rankings walk reviews in input
/// order, which makes first-seen order the tiebreaker.
///
/// With zero reviews the report is marked `no_data` and carries no average.
#[must_use]
pub fn assemble_report(
    app_info: AppInfo,
    reviews: &[NormalizedReview],
    stats: &RatingStats,
    annotations: &[SentimentAnnotation],
    annotation_failures: usize,
    top_n: usize,
    generated_at: DateTime<Utc>,
) -> InsightReport {
    let by_id: HashMap<&str, &SentimentAnnotation> = annotations
        .iter()
        .map(|a| (a.review_id.as_str(), a))
        .collect();
    let matched: Vec<Option<&SentimentAnnotation>> = reviews
        .iter()
        .map(|r| by_id.get(r.review_id.as_str()).copied())
        .collect();

    let mut sentiment_distribution: BTreeMap<SentimentLabel, u64> = BTreeMap::new();
    for annotation in &matched {
        let label = annotation.map_or(SentimentLabel::Unknown, |a| a.label);
        *sentiment_distribution.entry(label).or_insert(0) += 1;
    }

    let annotated = || matched.iter().flatten();
    let top_topics = rank_tags(annotated().map(|a| a.topics.as_slice()), top_n);
    let top_issues = rank_tags(annotated().map(|a| a.issues.as_slice()), top_n);
    let top_praises = rank_tags(annotated().map(|a| a.praises.as_slice()), top_n);

    let average_rating = stats.average_rating().ok();

    InsightReport {
        app_info,
        total_reviews: stats.total,
        no_data: stats.total == 0,
        average_rating,
        rating_distribution: stats.distribution,
        sentiment_distribution,
        top_topics,
        top_issues,
        top_praises,
        annotation_failures: annotation_failures as u64,
        generated_at,
    }
}

/// Count tags across annotations and keep the `limit` most frequent.
///
/// A tag repeated inside one annotation counts once. Sorting is stable, so
/// equal counts stay in the order the tags were first seen.
pub fn rank_tags<'a, I>(tag_lists: I, limit: usize) -> Vec<TopicCount>
where
    I: IntoIterator<Item = &'a [String]>,
{
    let mut counts: Vec<(&str, u64)> = Vec::new();
    let mut position: HashMap<&str, usize> = HashMap::new();

    for tags in tag_lists {
        let mut seen_here = HashSet::new();
        for tag in tags {
            if !seen_here.insert(tag.as_str()) {
                continue;
            }
            match position.get(tag.as_str()) {
                Some(&idx) => counts[idx].1 += 1,
                None => {
                    position.insert(tag.as_str(), counts.len());
                    counts.push((tag.as_str(), 1));
                }
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(limit)
        .map(|(tag, count)| TopicCount {
            tag: tag.to_string(),
            count,
        })
        .collect()
}
