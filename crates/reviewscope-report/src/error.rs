use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure of one report-generation run.
///
/// Every variant aborts the run and nothing is persisted, except
/// [`ReportError::EmptyInput`], which the assembler absorbs into a
/// `no_data` report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("review source failed: {0}")]
    Source(#[from] SourceError),

    #[error("invalid review {review_id}: {reason}")]
    Validation { review_id: String, reason: String },

    #[error("no reviews available to compute statistics")]
    EmptyInput,

    #[error(
        "report counts are inconsistent: {total} reviews, {rating_sum} in rating buckets, {sentiment_sum} in sentiment buckets"
    )]
    Inconsistent {
        total: u64,
        rating_sum: u64,
        sentiment_sum: u64,
    },

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("persistence worker failed: {0}")]
    PersistWorker(#[from] tokio::task::JoinError),

    #[error("report generation cancelled during {stage}")]
    Cancelled { stage: &'static str },
}

impl ReportError {
    /// Pipeline stage the error came from.
    #[must_use]
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Source(_) => "fetch",
            Self::Validation { .. } => "normalize",
            Self::EmptyInput => "aggregate",
            Self::Inconsistent { .. } => "assemble",
            Self::Serialize(_) | Self::Persistence { .. } | Self::PersistWorker(_) => "persist",
            Self::Cancelled { stage } => *stage,
        }
    }
}

/// Failure at the input boundary.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Deserialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("source has no data for app {requested} (it holds {found})")]
    UnknownApp { requested: String, found: String },
}
