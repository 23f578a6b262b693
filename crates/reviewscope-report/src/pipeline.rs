//! End-to-end report generation.
//!
//! ```text
//! fetch -> normalize -> ( aggregate || annotate ) -> assemble -> persist
//! ```
//!
//! Aggregation and annotation both read the normalized reviews and run
//! concurrently; assembly waits for both. Any stage error aborts the run
//! before persistence, so a failed run never leaves a report on disk.

use std::time::Instant;

use chrono::Utc;
use reviewscope_annotate::{annotate_reviews, AnnotateOptions, Annotator};
use reviewscope_core::{AppInfo, InsightReport, RawReview, ReportConfig};
use tokio_util::sync::CancellationToken;

use crate::assemble::assemble_report;
use crate::error::ReportError;
use crate::normalize::normalize_reviews;
use crate::persist::{persist_report, ReportArtifacts};
use crate::source::{FetchOptions, ReviewSource};
use crate::stats::{aggregate, RatingStats};

/// A persisted report together with where it was written.
#[derive(Debug, Clone)]
pub struct GeneratedReport {
    pub report: InsightReport,
    pub artifacts: ReportArtifacts,
}

/// Run every stage except fetch and persist.
///
/// # Errors
///
/// - [`ReportError::Validation`] if any raw review fails normalization.
/// - [`ReportError::Cancelled`] if `cancel` fires before assembly.
/// - [`ReportError::Inconsistent`] if the assembled counts disagree.
///
/// Individual annotation failures are not errors; they are counted in the
/// report's `annotation_failures`.
pub async fn build_report(
    app_info: AppInfo,
    raw_reviews: &[RawReview],
    annotator: &dyn Annotator,
    config: &ReportConfig,
    cancel: &CancellationToken,
) -> Result<InsightReport, ReportError> {
    if cancel.is_cancelled() {
        return Err(ReportError::Cancelled { stage: "normalize" });
    }

    let reviews = normalize_reviews(raw_reviews)?;
    tracing::info!(
        app_id = %app_info.app_id,
        reviews = reviews.len(),
        "normalized reviews"
    );

    let options = AnnotateOptions::from_config(config);
    let started = Instant::now();
    let (stats, batch) = tokio::join!(
        async { aggregate(&reviews) },
        annotate_reviews(annotator, &reviews, &options, cancel),
    );
    let batch = batch.map_err(|_| ReportError::Cancelled { stage: "annotate" })?;
    let stats: RatingStats = stats?;
    tracing::info!(
        app_id = %app_info.app_id,
        annotator = annotator.name(),
        annotated = batch.annotations.len(),
        failures = batch.failures,
        elapsed = ?started.elapsed(),
        "aggregation and annotation complete"
    );

    if cancel.is_cancelled() {
        return Err(ReportError::Cancelled { stage: "assemble" });
    }

    let report = assemble_report(
        app_info,
        &reviews,
        &stats,
        &batch.annotations,
        batch.failures,
        config.top_topics_n,
        Utc::now(),
    );

    if !report.is_consistent() {
        return Err(ReportError::Inconsistent {
            total: report.total_reviews,
            rating_sum: report.rating_distribution.total(),
            sentiment_sum: report.sentiment_distribution.values().sum(),
        });
    }

    if report.no_data {
        tracing::warn!(app_id = %report.app_info.app_id, "no reviews, report marked no_data");
    }
    Ok(report)
}

/// Fetch, build, and persist a report for `app_id`.
///
/// Files are written to `config.output_directory` only after every earlier
/// stage has succeeded.
///
/// # Errors
///
/// Any [`ReportError`]; see [`build_report`] and
/// [`persist_report`](crate::persist::persist_report). Source failures are
/// reported as [`ReportError::Source`].
pub async fn generate_report<S>(
    source: &S,
    app_id: &str,
    annotator: &dyn Annotator,
    config: &ReportConfig,
    cancel: &CancellationToken,
) -> Result<GeneratedReport, ReportError>
where
    S: ReviewSource + ?Sized,
{
    let fetch = FetchOptions::from_config(config);
    tracing::info!(
        app_id,
        count = fetch.count,
        language = %fetch.language,
        country = %fetch.country,
        "fetching reviews"
    );

    let app_info = tokio::select! {
        biased;
        () = cancel.cancelled() => return Err(ReportError::Cancelled { stage: "fetch" }),
        info = source.fetch_app_info(app_id, &fetch) => info?,
    };
    let raw_reviews = tokio::select! {
        biased;
        () = cancel.cancelled() => return Err(ReportError::Cancelled { stage: "fetch" }),
        reviews = source.fetch_reviews(app_id, &fetch) => reviews?,
    };

    let report = build_report(app_info, &raw_reviews, annotator, config, cancel).await?;

    if cancel.is_cancelled() {
        return Err(ReportError::Cancelled { stage: "persist" });
    }
    // File writes and fsyncs run on the blocking pool.
    let dir = config.output_directory.clone();
    let (report, persisted) = tokio::task::spawn_blocking(move || {
        let persisted = persist_report(&report, &dir);
        (report, persisted)
    })
    .await?;
    let artifacts = persisted?;

    tracing::info!(
        app_id,
        total_reviews = report.total_reviews,
        annotation_failures = report.annotation_failures,
        report = %artifacts.report_path.display(),
        "report generated"
    );
    Ok(GeneratedReport { report, artifacts })
}
