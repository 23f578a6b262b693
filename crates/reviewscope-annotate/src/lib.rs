//! Sentiment and topic annotation for reviewscope.
//!
//! The [`Annotator`] trait is the extension point. [`PlaceholderAnnotator`]
//! performs no analysis and labels every review `unknown`;
//! [`ClaudeAnnotator`] asks the Anthropic Messages API. [`annotate_reviews`]
//! fans calls out with bounded concurrency, a per-call timeout and retry
//! policy, and downgrades any failure to `unknown` instead of aborting.

pub mod annotator;
pub mod cache;
pub mod claude;
pub mod error;
pub mod runner;

mod retry;
mod tags;

pub use annotator::{Annotation, Annotator, PlaceholderAnnotator};
pub use cache::CachedAnnotator;
pub use claude::ClaudeAnnotator;
pub use error::{AnnotationError, Cancelled};
pub use runner::{annotate_reviews, AnnotateOptions, AnnotationBatch};
pub use tags::normalize_tags;
