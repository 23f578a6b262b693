//! Atomic persistence of the report document and its chart.
//!
//! Both files are staged as temp files in the destination directory, flushed
//! and fsynced, then renamed into place. A temp file that is never renamed is
//! deleted when it goes out of scope, so no exit path leaves partial output.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use reviewscope_core::InsightReport;
use tempfile::NamedTempFile;

use crate::chart::render_report_chart;
use crate::error::ReportError;

/// Where a run's output landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportArtifacts {
    pub report_path: PathBuf,
    pub chart_path: PathBuf,
}

/// Output paths for `app_id` inside `dir`.
///
/// Characters outside `[A-Za-z0-9._-]` are replaced with `_` so an app id
/// can never escape the output directory.
#[must_use]
pub fn report_paths(dir: &Path, app_id: &str) -> ReportArtifacts {
    let stem: String = app_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = stem.trim_start_matches('.');
    let stem = if stem.is_empty() { "app" } else { stem };
    ReportArtifacts {
        report_path: dir.join(format!("{stem}_report.json")),
        chart_path: dir.join(format!("{stem}_sentiment.svg")),
    }
}

/// Write `{app_id}_report.json` and `{app_id}_sentiment.svg` into `dir`.
///
/// # Errors
///
/// Returns [`ReportError::Serialize`] if the report cannot be encoded, or
/// [`ReportError::Persistence`] naming the path that could not be written.
/// On error neither file is left behind by this call.
pub fn persist_report(report: &InsightReport, dir: &Path) -> Result<ReportArtifacts, ReportError> {
    let paths = report_paths(dir, &report.app_info.app_id);

    fs::create_dir_all(dir).map_err(|source| ReportError::Persistence {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut document = serde_json::to_vec_pretty(report)?;
    document.push(b'\n');
    let chart = render_report_chart(report);

    let staged_report = stage(dir, &document).map_err(|source| ReportError::Persistence {
        path: paths.report_path.clone(),
        source,
    })?;
    let staged_chart = stage(dir, chart.as_bytes()).map_err(|source| ReportError::Persistence {
        path: paths.chart_path.clone(),
        source,
    })?;

    staged_chart
        .persist(&paths.chart_path)
        .map_err(|e| ReportError::Persistence {
            path: paths.chart_path.clone(),
            source: e.error,
        })?;

    if let Err(e) = staged_report.persist(&paths.report_path) {
        if let Err(cleanup) = fs::remove_file(&paths.chart_path) {
            tracing::warn!(
                path = %paths.chart_path.display(),
                error = %cleanup,
                "failed to remove chart after report write failed"
            );
        }
        return Err(ReportError::Persistence {
            path: paths.report_path.clone(),
            source: e.error,
        });
    }

    tracing::info!(
        report = %paths.report_path.display(),
        chart = %paths.chart_path.display(),
        "report persisted"
    );
    Ok(paths)
}

fn stage(dir: &Path, bytes: &[u8]) -> io::Result<NamedTempFile> {
    let mut tmp = tempfile::Builder::new()
        .prefix(".reviewscope-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    Ok(tmp)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::Utc;
    use reviewscope_core::{AppInfo, RatingDistribution, SentimentLabel};
    use tempfile::TempDir;

    use super::*;

    fn sample_report(app_id: &str) -> InsightReport {
        let mut dist = RatingDistribution::default();
        dist.record(5);
        let mut sentiment = BTreeMap::new();
        sentiment.insert(SentimentLabel::Unknown, 1);
        InsightReport {
            app_info: AppInfo {
                app_id: app_id.to_owned(),
                title: "Sample".to_owned(),
                developer: None,
                score: Some(4.5),
                reviews: None,
                installs: None,
                category: "Games".to_owned(),
                price: None,
                size: None,
                updated: None,
                content_rating: None,
            },
            total_reviews: 1,
            no_data: false,
            average_rating: Some(5.0),
            rating_distribution: dist,
            sentiment_distribution: sentiment,
            top_topics: vec![],
            top_issues: vec![],
            top_praises: vec![],
            annotation_failures: 0,
            generated_at: Utc::now(),
        }
    }

    fn leftover_temp_files(dir: &Path) -> usize {
        fs::read_dir(dir)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .count()
    }

    #[test]
    fn report_paths_use_app_id() {
        let paths = report_paths(Path::new("reports"), "com.example.app");
        assert_eq!(
            paths.report_path,
            Path::new("reports/com.example.app_report.json")
        );
        assert_eq!(
            paths.chart_path,
            Path::new("reports/com.example.app_sentiment.svg")
        );
    }

    #[test]
    fn report_paths_cannot_escape_directory() {
        let paths = report_paths(Path::new("out"), "../../etc/passwd");
        assert_eq!(paths.report_path.parent(), Some(Path::new("out")));
    }

    #[test]
    fn writes_both_files_and_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("nested").join("reports");
        let artifacts = persist_report(&sample_report("com.example.app"), &out).unwrap();

        let json: serde_json::Value =
            serde_json::from_slice(&fs::read(&artifacts.report_path).unwrap()).unwrap();
        assert_eq!(json["total_reviews"], 1);
        assert_eq!(json["rating_distribution"]["5"], 1);
        assert_eq!(json["sentiment_distribution"]["unknown"], 1);

        let svg = fs::read_to_string(&artifacts.chart_path).unwrap();
        assert!(svg.contains("<svg"));
        assert_eq!(leftover_temp_files(&out), 0);
    }

    #[test]
    fn persisted_report_reads_back() {
        let dir = TempDir::new().unwrap();
        let report = sample_report("com.example.app");
        let artifacts = persist_report(&report, dir.path()).unwrap();
        let back: InsightReport =
            serde_json::from_slice(&fs::read(&artifacts.report_path).unwrap()).unwrap();
        assert_eq!(back.rating_distribution, report.rating_distribution);
        assert_eq!(back.sentiment_distribution, report.sentiment_distribution);
    }

    #[test]
    fn unwritable_destination_is_a_persistence_error() {
        let dir = TempDir::new().unwrap();
        // A regular file where the output directory should be.
        let blocker = dir.path().join("reports");
        fs::write(&blocker, b"not a directory").unwrap();

        let err = persist_report(&sample_report("com.example.app"), &blocker).unwrap_err();
        assert!(matches!(err, ReportError::Persistence { .. }), "got {err:?}");
        assert_eq!(err.stage(), "persist");
    }

    #[test]
    fn failed_report_rename_removes_chart() {
        let dir = TempDir::new().unwrap();
        let paths = report_paths(dir.path(), "com.example.app");
        // A non-empty directory at the report path makes the final rename fail.
        fs::create_dir_all(paths.report_path.join("occupied")).unwrap();

        let err = persist_report(&sample_report("com.example.app"), dir.path()).unwrap_err();
        assert!(matches!(err, ReportError::Persistence { ref path, .. } if *path == paths.report_path));
        assert!(!paths.chart_path.exists());
        assert_eq!(leftover_temp_files(dir.path()), 0);
    }
}
