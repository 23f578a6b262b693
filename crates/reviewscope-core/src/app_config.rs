use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_REVIEW_COUNT: usize = 1000;
pub const DEFAULT_OUTPUT_DIRECTORY: &str = "reports";
pub const DEFAULT_TOP_TOPICS_N: usize = 10;
pub const DEFAULT_ANNOTATION_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_ANNOTATION_MAX_CONCURRENCY: usize = 4;
pub const DEFAULT_ANNOTATION_MAX_RETRIES: u32 = 2;
pub const DEFAULT_ANNOTATION_BACKOFF_BASE_MS: u64 = 500;
pub const DEFAULT_ANNOTATOR_MODEL: &str = "claude-3-7-sonnet-20250219";
pub const DEFAULT_ANNOTATOR_BASE_URL: &str = "https://api.anthropic.com/";

/// Which annotator implementation the pipeline should plug in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotatorKind {
    /// No analysis; every review is labeled `unknown`.
    Placeholder,
    /// Anthropic Messages API.
    Claude,
}

impl std::fmt::Display for AnnotatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnnotatorKind::Placeholder => write!(f, "placeholder"),
            AnnotatorKind::Claude => write!(f, "claude"),
        }
    }
}

#[derive(Clone)]
pub struct AnnotatorConfig {
    pub kind: AnnotatorKind,
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            kind: AnnotatorKind::Placeholder,
            api_key: None,
            model: DEFAULT_ANNOTATOR_MODEL.to_string(),
            base_url: DEFAULT_ANNOTATOR_BASE_URL.to_string(),
        }
    }
}

impl std::fmt::Debug for AnnotatorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnotatorConfig")
            .field("kind", &self.kind)
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Settings for one report-generation run.
///
/// Passed explicitly into the pipeline so tests and concurrent runs never
/// share ambient state.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Number of reviews to request from the review source.
    pub review_count: usize,
    pub output_directory: PathBuf,
    pub top_topics_n: usize,
    /// Limit for a single annotation attempt. Always non-zero when loaded
    /// through [`load_config`](crate::load_config).
    pub annotation_timeout: Duration,
    pub annotation_max_concurrency: usize,
    pub annotation_max_retries: u32,
    pub annotation_backoff_base_ms: u64,
    /// Passed through to the review source unmodified.
    pub language: String,
    /// Passed through to the review source unmodified.
    pub country: String,
    pub log_level: String,
    pub annotator: AnnotatorConfig,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            review_count: DEFAULT_REVIEW_COUNT,
            output_directory: PathBuf::from(DEFAULT_OUTPUT_DIRECTORY),
            top_topics_n: DEFAULT_TOP_TOPICS_N,
            annotation_timeout: DEFAULT_ANNOTATION_TIMEOUT,
            annotation_max_concurrency: DEFAULT_ANNOTATION_MAX_CONCURRENCY,
            annotation_max_retries: DEFAULT_ANNOTATION_MAX_RETRIES,
            annotation_backoff_base_ms: DEFAULT_ANNOTATION_BACKOFF_BASE_MS,
            language: "en".to_string(),
            country: "us".to_string(),
            log_level: "info".to_string(),
            annotator: AnnotatorConfig::default(),
        }
    }
}
