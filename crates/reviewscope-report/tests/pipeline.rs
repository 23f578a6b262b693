//! End-to-end runs of the report pipeline against in-memory and file sources.

use std::fs;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reviewscope_annotate::{Annotation, AnnotationError, Annotator, PlaceholderAnnotator};
use reviewscope_core::{AppInfo, RawReview, ReportConfig, SentimentLabel};
use reviewscope_report::{
    build_report, generate_report, InMemorySource, JsonFileSource, ReportError, ReviewFixture,
};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

const APP_ID: &str = "com.example.game";

fn app_info() -> AppInfo {
    AppInfo {
        app_id: APP_ID.to_owned(),
        title: "Example Game".to_owned(),
        developer: Some("Example Studio".to_owned()),
        score: Some(4.1),
        reviews: Some(120_000),
        installs: None,
        category: "Games".to_owned(),
        price: Some(0.0),
        size: None,
        updated: None,
        content_rating: Some("Everyone".to_owned()),
    }
}

fn raw(id: &str, score: i32, content: Option<&str>) -> RawReview {
    RawReview {
        review_id: id.to_owned(),
        content: content.map(str::to_owned),
        score,
        at: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
        user_name: "player".to_owned(),
        reply_content: None,
    }
}

fn config(out: &Path) -> ReportConfig {
    ReportConfig {
        output_directory: out.to_path_buf(),
        annotation_timeout: Duration::from_millis(200),
        annotation_max_retries: 0,
        annotation_backoff_base_ms: 0,
        ..ReportConfig::default()
    }
}

fn dir_is_empty_or_missing(path: &Path) -> bool {
    fs::read_dir(path).map_or(true, |mut entries| entries.next().is_none())
}

/// Positive for "good", negative for "bad", hangs on "hang".
struct KeywordAnnotator;

#[async_trait]
impl Annotator for KeywordAnnotator {
    fn name(&self) -> &'static str {
        "keyword"
    }

    async fn annotate(&self, text: &str) -> Result<Annotation, AnnotationError> {
        if text.contains("hang") {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
        let (label, issues, praises) = if text.contains("bad") {
            (SentimentLabel::Negative, vec!["crashes".to_owned()], vec![])
        } else if text.contains("good") {
            (SentimentLabel::Positive, vec![], vec!["graphics".to_owned()])
        } else {
            (SentimentLabel::Neutral, vec![], vec![])
        };
        Ok(Annotation {
            label,
            topics: vec!["gameplay".to_owned()],
            issues,
            praises,
        })
    }
}

#[tokio::test]
async fn placeholder_run_counts_ratings_and_unknown_sentiment() {
    let out = TempDir::new().unwrap();
    let source = InMemorySource::new(
        app_info(),
        vec![
            raw("r1", 5, Some("love it")),
            raw("r2", 5, Some("great")),
            raw("r3", 3, None),
            raw("r4", 1, Some("broken")),
            raw("r5", 1, Some("refund")),
        ],
    );

    let generated = generate_report(
        &source,
        APP_ID,
        &PlaceholderAnnotator,
        &config(out.path()),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    let report = &generated.report;
    assert_eq!(report.total_reviews, 5);
    assert!(!report.no_data);
    let counts: Vec<(u8, u64)> = report.rating_distribution.iter().collect();
    assert_eq!(counts, [(1, 2), (2, 0), (3, 1), (4, 0), (5, 2)]);
    assert_eq!(report.sentiment_distribution.len(), 1);
    assert_eq!(report.sentiment_distribution[&SentimentLabel::Unknown], 5);
    assert_eq!(report.average_rating, Some(3.0));
    assert_eq!(report.annotation_failures, 0);
    assert!(report.top_topics.is_empty());

    let json: serde_json::Value =
        serde_json::from_slice(&fs::read(&generated.artifacts.report_path).unwrap()).unwrap();
    assert_eq!(json["rating_distribution"]["1"], 2);
    assert_eq!(json["rating_distribution"]["4"], 0);
    assert_eq!(json["sentiment_distribution"]["unknown"], 5);
    let chart = fs::read_to_string(&generated.artifacts.chart_path).unwrap();
    assert!(chart.contains("Rating Distribution for Example Game"));
    assert!(chart.contains("Sentiment Distribution"));
}

#[tokio::test]
async fn empty_input_writes_no_data_report() {
    let out = TempDir::new().unwrap();
    let source = InMemorySource::new(app_info(), vec![]);

    let generated = generate_report(
        &source,
        APP_ID,
        &PlaceholderAnnotator,
        &config(out.path()),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    let report = &generated.report;
    assert!(report.no_data);
    assert_eq!(report.total_reviews, 0);
    assert_eq!(report.average_rating, None);
    assert!(report.rating_distribution.iter().all(|(_, n)| n == 0));
    assert!(report.sentiment_distribution.is_empty());
    assert!(generated.artifacts.report_path.exists());
    assert!(generated.artifacts.chart_path.exists());
}

#[tokio::test]
async fn out_of_range_rating_aborts_without_output() {
    let out = TempDir::new().unwrap();
    let target = out.path().join("reports");
    let source = InMemorySource::new(
        app_info(),
        vec![raw("ok", 4, Some("fine")), raw("bad-id", 6, Some("six stars"))],
    );

    let err = generate_report(
        &source,
        APP_ID,
        &PlaceholderAnnotator,
        &config(&target),
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();

    match err {
        ReportError::Validation { ref review_id, .. } => assert_eq!(review_id, "bad-id"),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(err.stage(), "normalize");
    assert!(dir_is_empty_or_missing(&target));
}

#[tokio::test]
async fn timed_out_annotation_is_counted_as_unknown() {
    let out = TempDir::new().unwrap();
    let raws = vec![
        raw("r1", 5, Some("good fun")),
        raw("r2", 1, Some("bad crashes")),
        raw("r3", 2, Some("hang forever")),
        raw("r4", 4, Some("good again")),
    ];

    let report = build_report(
        app_info(),
        &raws,
        &KeywordAnnotator,
        &config(out.path()),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.total_reviews, 4);
    assert_eq!(report.annotation_failures, 1);
    assert_eq!(report.sentiment_distribution[&SentimentLabel::Unknown], 1);
    assert_eq!(report.sentiment_distribution[&SentimentLabel::Positive], 2);
    assert_eq!(report.sentiment_distribution[&SentimentLabel::Negative], 1);
    assert!(report.is_consistent());

    assert_eq!(report.top_topics[0].tag, "gameplay");
    assert_eq!(report.top_topics[0].count, 3);
    assert_eq!(report.top_praises[0].tag, "graphics");
    assert_eq!(report.top_praises[0].count, 2);
    assert_eq!(report.top_issues[0].tag, "crashes");
}

#[tokio::test]
async fn cancelled_run_writes_nothing() {
    let out = TempDir::new().unwrap();
    let target = out.path().join("reports");
    let source = InMemorySource::new(app_info(), vec![raw("r1", 5, Some("good"))]);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = generate_report(
        &source,
        APP_ID,
        &KeywordAnnotator,
        &config(&target),
        &cancel,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ReportError::Cancelled { .. }), "got {err:?}");
    assert!(dir_is_empty_or_missing(&target));
}

#[tokio::test]
async fn cancellation_during_annotation_writes_nothing() {
    let out = TempDir::new().unwrap();
    let target = out.path().join("reports");
    let source = InMemorySource::new(
        app_info(),
        vec![raw("r1", 5, Some("hang")), raw("r2", 4, Some("hang too"))],
    );
    let mut cfg = config(&target);
    cfg.annotation_timeout = Duration::from_secs(30);
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let err = generate_report(&source, APP_ID, &KeywordAnnotator, &cfg, &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, ReportError::Cancelled { stage: "annotate" }), "got {err:?}");
    assert!(dir_is_empty_or_missing(&target));
}

#[tokio::test]
async fn duplicate_review_ids_abort_without_output() {
    let out = TempDir::new().unwrap();
    let target = out.path().join("reports");
    let source = InMemorySource::new(
        app_info(),
        vec![
            raw("dup", 5, Some("good")),
            raw("other", 4, Some("good")),
            raw("dup", 1, Some("bad")),
        ],
    );

    let err = generate_report(
        &source,
        APP_ID,
        &KeywordAnnotator,
        &config(&target),
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();

    assert!(
        matches!(err, ReportError::Validation { ref review_id, .. } if review_id == "dup"),
        "got {err:?}"
    );
    assert!(dir_is_empty_or_missing(&target));
}

#[tokio::test(flavor = "current_thread")]
async fn unwritable_output_directory_is_a_persist_error() {
    let out = TempDir::new().unwrap();
    let blocker = out.path().join("reports");
    fs::write(&blocker, b"a file, not a directory").unwrap();
    let source = InMemorySource::new(app_info(), vec![raw("r1", 5, Some("good"))]);

    let err = generate_report(
        &source,
        APP_ID,
        &PlaceholderAnnotator,
        &config(&blocker),
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ReportError::Persistence { .. }), "got {err:?}");
    assert_eq!(err.stage(), "persist");
}

#[tokio::test]
async fn unknown_app_is_a_fetch_error() {
    let out = TempDir::new().unwrap();
    let source = InMemorySource::new(app_info(), vec![]);

    let err = generate_report(
        &source,
        "com.example.missing",
        &PlaceholderAnnotator,
        &config(out.path()),
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ReportError::Source(_)));
    assert_eq!(err.stage(), "fetch");
}

#[tokio::test]
async fn json_fixture_source_respects_review_count() {
    let out = TempDir::new().unwrap();
    let fixture = ReviewFixture {
        app_info: app_info(),
        reviews: (1..=5)
            .map(|i| raw(&format!("r{i}"), i, Some("good")))
            .collect(),
    };
    let fixture_path = out.path().join("fixture.json");
    fs::write(&fixture_path, serde_json::to_vec(&fixture).unwrap()).unwrap();

    let mut cfg = config(&out.path().join("reports"));
    cfg.review_count = 3;

    let generated = generate_report(
        &JsonFileSource::new(&fixture_path),
        APP_ID,
        &KeywordAnnotator,
        &cfg,
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    let report = &generated.report;
    assert_eq!(report.total_reviews, 3);
    let counts: Vec<(u8, u64)> = report.rating_distribution.iter().collect();
    assert_eq!(counts, [(1, 1), (2, 1), (3, 1), (4, 0), (5, 0)]);
    assert_eq!(report.sentiment_distribution[&SentimentLabel::Positive], 3);
    assert_eq!(
        generated.artifacts.report_path,
        out.path().join("reports").join(format!("{APP_ID}_report.json"))
    );
}
