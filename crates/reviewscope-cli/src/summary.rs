//! Plain-text rendering of an [`InsightReport`] for the terminal.

use std::fmt::Write;
use std::path::Path;

use anyhow::Context;
use reviewscope_core::{InsightReport, TopicCount};

const BAR_WIDTH: u64 = 30;

/// `summary` command: read a persisted report and print it.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a report document.
pub(crate) fn run_summary(path: &Path) -> anyhow::Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let report: InsightReport = serde_json::from_slice(&bytes)
        .with_context(|| format!("{} is not a report document", path.display()))?;
    print!("{}", render_summary(&report));
    Ok(())
}

pub(crate) fn render_summary(report: &InsightReport) -> String {
    let mut output = String::new();
    let info = &report.app_info;

    let _ = writeln!(output, "{} ({})", info.title, info.app_id);
    if let Some(developer) = &info.developer {
        let _ = writeln!(output, "developer: {developer}");
    }
    let _ = writeln!(
        output,
        "generated: {}",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(output);

    if report.no_data {
        let _ = writeln!(output, "No reviews were available for this app.");
        return output;
    }

    match report.average_rating {
        Some(avg) => {
            let _ = writeln!(
                output,
                "{} reviews, average rating {avg:.2}",
                report.total_reviews
            );
        }
        None => {
            let _ = writeln!(output, "{} reviews", report.total_reviews);
        }
    }
    let _ = writeln!(output);

    let _ = writeln!(output, "Ratings");
    let peak = report
        .rating_distribution
        .iter()
        .map(|(_, count)| count)
        .max()
        .unwrap_or(0);
    let buckets: Vec<(u8, u64)> = report.rating_distribution.iter().collect();
    for &(rating, count) in buckets.iter().rev() {
        let width = if peak == 0 { 0 } else { count * BAR_WIDTH / peak };
        let bar = "#".repeat(usize::try_from(width).unwrap_or(0));
        let _ = writeln!(output, "  {rating}* {count:>6} {bar}");
    }
    let _ = writeln!(output);

    let _ = writeln!(output, "Sentiment");
    for (label, count) in &report.sentiment_distribution {
        let _ = writeln!(output, "  {:<8} {count:>6}", label.as_str());
    }
    if report.annotation_failures > 0 {
        let _ = writeln!(
            output,
            "  ({} reviews could not be annotated)",
            report.annotation_failures
        );
    }

    write_tags(&mut output, "Top topics", &report.top_topics);
    write_tags(&mut output, "Top issues", &report.top_issues);
    write_tags(&mut output, "Top praises", &report.top_praises);

    output
}

fn write_tags(output: &mut String, heading: &str, tags: &[TopicCount]) {
    if tags.is_empty() {
        return;
    }
    let _ = writeln!(output);
    let _ = writeln!(output, "{heading}");
    for tag in tags {
        let _ = writeln!(output, "  {:<24} {:>6}", tag.tag, tag.count);
    }
}
