mod generate;
mod summary;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "reviewscope")]
#[command(about = "Play Store review insight reports")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Build a report from a captured review fixture and write it to disk.
    Generate {
        /// JSON file holding `app_info` and `reviews`.
        #[arg(long)]
        input: PathBuf,
        /// Play Store package id; must match the fixture's `app_info.app_id`.
        #[arg(long)]
        app_id: String,
        /// Overrides `REVIEWSCOPE_OUTPUT_DIR`.
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Overrides `REVIEWSCOPE_TOP_TOPICS_N`.
        #[arg(long)]
        top_topics: Option<usize>,
        /// Overrides `REVIEWSCOPE_REVIEW_COUNT`.
        #[arg(long)]
        count: Option<usize>,
    },
    /// Print a summary of a previously written report.
    Summary {
        #[arg(long)]
        report: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = reviewscope_core::load_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Generate {
            input,
            app_id,
            output_dir,
            top_topics,
            count,
        } => {
            generate::apply_overrides(&mut config, output_dir, top_topics, count);

            let cancel = CancellationToken::new();
            let trigger = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("received ctrl-c, cancelling report generation");
                    trigger.cancel();
                }
            });

            let generated = generate::run_generate(&config, &input, &app_id, &cancel).await?;
            print!("{}", summary::render_summary(&generated.report));
            println!("report: {}", generated.artifacts.report_path.display());
            println!("chart:  {}", generated.artifacts.chart_path.display());
        }
        Commands::Summary { report } => summary::run_summary(&report)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests;
