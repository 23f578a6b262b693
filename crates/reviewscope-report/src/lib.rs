//! Report generation for reviewscope.
//!
//! Turns raw Play Store reviews into an [`InsightReport`](reviewscope_core::InsightReport):
//! normalize, aggregate ratings and annotate sentiment side by side, assemble
//! the summary, then write the JSON document and its chart atomically.

pub mod assemble;
pub mod chart;
pub mod error;
pub mod normalize;
pub mod persist;
pub mod pipeline;
pub mod source;
pub mod stats;

pub use assemble::{assemble_report, rank_tags};
pub use chart::render_report_chart;
pub use error::{ReportError, SourceError};
pub use normalize::{normalize_review, normalize_reviews};
pub use persist::{persist_report, report_paths, ReportArtifacts};
pub use pipeline::{build_report, generate_report, GeneratedReport};
pub use source::{FetchOptions, InMemorySource, JsonFileSource, ReviewFixture, ReviewSource};
pub use stats::{aggregate, RatingStats};
