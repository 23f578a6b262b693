use std::collections::BTreeMap;
use std::path::Path;

use chrono::Utc;
use clap::Parser;
use reviewscope_annotate::Annotator as _;
use reviewscope_core::{
    AnnotatorConfig, AnnotatorKind, AppInfo, InsightReport, RatingDistribution, ReportConfig,
    SentimentLabel, TopicCount,
};
use tokio_util::sync::CancellationToken;

use super::*;

fn sample_report() -> InsightReport {
    let mut dist = RatingDistribution::default();
    for rating in [5, 5, 4, 1] {
        dist.record(rating);
    }
    let mut sentiment = BTreeMap::new();
    sentiment.insert(SentimentLabel::Positive, 3);
    sentiment.insert(SentimentLabel::Negative, 1);
    InsightReport {
        app_info: AppInfo {
            app_id: "com.example.app".to_owned(),
            title: "Example".to_owned(),
            developer: Some("Example Inc".to_owned()),
            score: Some(4.0),
            reviews: None,
            installs: None,
            category: "Tools".to_owned(),
            price: None,
            size: None,
            updated: None,
            content_rating: None,
        },
        total_reviews: 4,
        no_data: false,
        average_rating: Some(3.75),
        rating_distribution: dist,
        sentiment_distribution: sentiment,
        top_topics: vec![TopicCount {
            tag: "battery".to_owned(),
            count: 2,
        }],
        top_issues: vec![],
        top_praises: vec![],
        annotation_failures: 1,
        generated_at: Utc::now(),
    }
}

#[test]
fn parses_generate_with_required_args() {
    let cli = Cli::try_parse_from([
        "reviewscope",
        "generate",
        "--input",
        "fixture.json",
        "--app-id",
        "com.example.app",
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Generate {
            ref app_id,
            output_dir: None,
            top_topics: None,
            count: None,
            ..
        } if app_id == "com.example.app"
    ));
}

#[test]
fn parses_generate_overrides() {
    let cli = Cli::try_parse_from([
        "reviewscope",
        "generate",
        "--input",
        "fixture.json",
        "--app-id",
        "com.example.app",
        "--output-dir",
        "out",
        "--top-topics",
        "3",
        "--count",
        "50",
    ])
    .unwrap();

    match cli.command {
        Commands::Generate {
            output_dir,
            top_topics,
            count,
            ..
        } => {
            assert_eq!(output_dir.as_deref(), Some(Path::new("out")));
            assert_eq!(top_topics, Some(3));
            assert_eq!(count, Some(50));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn generate_requires_app_id() {
    let result = Cli::try_parse_from(["reviewscope", "generate", "--input", "fixture.json"]);
    assert!(result.is_err());
}

#[test]
fn parses_summary_command() {
    let cli = Cli::try_parse_from(["reviewscope", "summary", "--report", "r.json"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Summary { ref report } if report == Path::new("r.json")
    ));
}

#[test]
fn missing_subcommand_is_an_error() {
    assert!(Cli::try_parse_from(["reviewscope"]).is_err());
}

#[test]
fn overrides_replace_only_given_values() {
    let mut config = ReportConfig::default();
    generate::apply_overrides(&mut config, None, Some(4), None);
    assert_eq!(config.top_topics_n, 4);
    assert_eq!(config.review_count, ReportConfig::default().review_count);
    assert_eq!(
        config.output_directory,
        ReportConfig::default().output_directory
    );
}

#[test]
fn placeholder_annotator_is_built_by_default() {
    let annotator = generate::build_annotator(&AnnotatorConfig::default()).unwrap();
    assert_eq!(annotator.name(), "placeholder");
}

#[test]
fn claude_annotator_without_key_is_rejected() {
    let config = AnnotatorConfig {
        kind: AnnotatorKind::Claude,
        api_key: None,
        ..AnnotatorConfig::default()
    };
    let err = generate::build_annotator(&config).err().unwrap();
    assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
}

#[test]
fn summary_lists_ratings_sentiment_and_tags() {
    let text = summary::render_summary(&sample_report());
    assert!(text.starts_with("Example (com.example.app)"));
    assert!(text.contains("4 reviews, average rating 3.75"));
    assert!(text.contains("positive"));
    assert!(text.contains("1 reviews could not be annotated"));
    assert!(text.contains("Top topics"));
    assert!(text.contains("battery"));
    assert!(!text.contains("Top issues"));

    let five = text.find("5*").unwrap();
    let one = text.find("1*").unwrap();
    assert!(five < one, "ratings should be listed from 5 down to 1");
}

#[test]
fn summary_of_empty_report_says_no_data() {
    let mut report = sample_report();
    report.no_data = true;
    report.total_reviews = 0;
    let text = summary::render_summary(&report);
    assert!(text.contains("No reviews were available"));
    assert!(!text.contains("Ratings"));
}

#[tokio::test]
async fn generate_writes_report_from_fixture() {
    let dir = tempfile::TempDir::new().unwrap();
    let fixture = dir.path().join("fixture.json");
    std::fs::write(
        &fixture,
        r#"{
            "app_info": {"app_id": "com.example.app", "title": "Example", "category": "Tools"},
            "reviews": [
                {"reviewId": "a", "content": "ok", "score": 4, "at": "2025-01-01T00:00:00Z"},
                {"reviewId": "b", "content": "meh", "score": 2, "at": "2025-01-02T00:00:00Z"}
            ]
        }"#,
    )
    .unwrap();

    let mut config = ReportConfig::default();
    generate::apply_overrides(&mut config, Some(dir.path().join("out")), None, None);

    let generated = generate::run_generate(
        &config,
        &fixture,
        "com.example.app",
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(generated.report.total_reviews, 2);
    assert!(generated.artifacts.report_path.exists());
    assert!(generated.artifacts.chart_path.exists());
}

#[tokio::test]
async fn generate_failure_names_the_stage() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = ReportConfig::default();
    let err = generate::run_generate(
        &config,
        &dir.path().join("absent.json"),
        "com.example.app",
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("fetch"), "got {err}");
}
