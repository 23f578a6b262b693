//! Domain types and configuration shared by the reviewscope crates.

pub mod app_config;
pub mod config;
pub mod report;
pub mod reviews;

pub use app_config::{AnnotatorConfig, AnnotatorKind, ReportConfig};
pub use config::{load_config, load_config_from_env};
pub use report::{InsightReport, RatingDistribution, TopicCount};
pub use reviews::{
    AppInfo, Installs, NormalizedReview, RawReview, SentimentAnnotation, SentimentLabel,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
