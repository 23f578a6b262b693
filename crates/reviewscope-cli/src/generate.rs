//! `generate` command handler.

use std::path::{Path, PathBuf};

use anyhow::Context;
use reviewscope_annotate::{Annotator, CachedAnnotator, ClaudeAnnotator, PlaceholderAnnotator};
use reviewscope_core::{AnnotatorConfig, AnnotatorKind, ReportConfig};
use reviewscope_report::{generate_report, GeneratedReport, JsonFileSource};
use tokio_util::sync::CancellationToken;

/// Apply command-line flags on top of the environment-derived config.
pub(crate) fn apply_overrides(
    config: &mut ReportConfig,
    output_dir: Option<PathBuf>,
    top_topics: Option<usize>,
    count: Option<usize>,
) {
    if let Some(dir) = output_dir {
        config.output_directory = dir;
    }
    if let Some(n) = top_topics {
        config.top_topics_n = n;
    }
    if let Some(n) = count {
        config.review_count = n;
    }
}

/// Construct the annotator selected by `REVIEWSCOPE_ANNOTATOR`.
///
/// The Claude annotator is wrapped in a cache so duplicate review texts in a
/// batch cost one API call.
///
/// # Errors
///
/// Returns an error if the Claude annotator is selected without an API key or
/// its HTTP client cannot be built.
pub(crate) fn build_annotator(config: &AnnotatorConfig) -> anyhow::Result<Box<dyn Annotator>> {
    match config.kind {
        AnnotatorKind::Placeholder => Ok(Box::new(PlaceholderAnnotator)),
        AnnotatorKind::Claude => {
            let api_key = config
                .api_key
                .as_deref()
                .context("ANTHROPIC_API_KEY is required for the claude annotator")?;
            let claude = ClaudeAnnotator::with_base_url(api_key, &config.model, &config.base_url)
                .context("failed to construct claude annotator")?;
            Ok(Box::new(CachedAnnotator::new(claude)))
        }
    }
}

/// Generate and persist a report from the fixture at `input`.
///
/// # Errors
///
/// Returns an error if the annotator cannot be built or any pipeline stage
/// fails; the failing stage is named in the error context.
pub(crate) async fn run_generate(
    config: &ReportConfig,
    input: &Path,
    app_id: &str,
    cancel: &CancellationToken,
) -> anyhow::Result<GeneratedReport> {
    let annotator = build_annotator(&config.annotator)?;
    let source = JsonFileSource::new(input);

    tracing::info!(
        app_id,
        input = %input.display(),
        annotator = %config.annotator.kind,
        output_dir = %config.output_directory.display(),
        "starting report generation"
    );

    generate_report(&source, app_id, annotator.as_ref(), config, cancel)
        .await
        .map_err(|e| {
            let stage = e.stage();
            anyhow::Error::new(e).context(format!("report generation failed at {stage}"))
        })
}
