//! Review sources: where app metadata and raw reviews come from.
//!
//! The pipeline only talks to [`ReviewSource`]. [`JsonFileSource`] reads a
//! captured fixture from disk and [`InMemorySource`] serves data held in
//! memory, which is what tests and embedding callers use.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reviewscope_core::{AppInfo, RawReview, ReportConfig};
use serde::{Deserialize, Serialize};

use crate::error::SourceError;

/// Fetch parameters passed through to the source unmodified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Maximum number of reviews to return.
    pub count: usize,
    pub language: String,
    pub country: String,
}

impl FetchOptions {
    #[must_use]
    pub fn from_config(config: &ReportConfig) -> Self {
        Self {
            count: config.review_count,
            language: config.language.clone(),
            country: config.country.clone(),
        }
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::from_config(&ReportConfig::default())
    }
}

#[async_trait]
pub trait ReviewSource: Send + Sync {
    /// Store listing metadata for `app_id`.
    async fn fetch_app_info(
        &self,
        app_id: &str,
        options: &FetchOptions,
    ) -> Result<AppInfo, SourceError>;

    /// Up to `options.count` reviews for `app_id`, in source order.
    async fn fetch_reviews(
        &self,
        app_id: &str,
        options: &FetchOptions,
    ) -> Result<Vec<RawReview>, SourceError>;
}

/// On-disk layout of a captured app listing and its reviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewFixture {
    pub app_info: AppInfo,
    #[serde(default)]
    pub reviews: Vec<RawReview>,
}

impl ReviewFixture {
    fn check_app(&self, app_id: &str) -> Result<(), SourceError> {
        if self.app_info.app_id == app_id {
            Ok(())
        } else {
            Err(SourceError::UnknownApp {
                requested: app_id.to_owned(),
                found: self.app_info.app_id.clone(),
            })
        }
    }

    fn take_reviews(&self, count: usize) -> Vec<RawReview> {
        self.reviews.iter().take(count).cloned().collect()
    }
}

/// Reads a [`ReviewFixture`] JSON file on every call.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<ReviewFixture, SourceError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| SourceError::Io {
                path: self.path.clone(),
                source,
            })?;
        serde_json::from_slice(&bytes).map_err(|source| SourceError::Deserialize {
            path: self.path.clone(),
            source,
        })
    }
}

#[async_trait]
impl ReviewSource for JsonFileSource {
    async fn fetch_app_info(
        &self,
        app_id: &str,
        _options: &FetchOptions,
    ) -> Result<AppInfo, SourceError> {
        let fixture = self.load().await?;
        fixture.check_app(app_id)?;
        Ok(fixture.app_info)
    }

    async fn fetch_reviews(
        &self,
        app_id: &str,
        options: &FetchOptions,
    ) -> Result<Vec<RawReview>, SourceError> {
        let fixture = self.load().await?;
        fixture.check_app(app_id)?;
        let reviews = fixture.take_reviews(options.count);
        tracing::debug!(
            path = %self.path.display(),
            app_id,
            available = fixture.reviews.len(),
            returned = reviews.len(),
            language = %options.language,
            country = %options.country,
            "loaded reviews from fixture"
        );
        Ok(reviews)
    }
}

/// Serves a fixed listing and review set.
#[derive(Debug, Clone)]
pub struct InMemorySource {
    fixture: ReviewFixture,
}

impl InMemorySource {
    #[must_use]
    pub fn new(app_info: AppInfo, reviews: Vec<RawReview>) -> Self {
        Self {
            fixture: ReviewFixture { app_info, reviews },
        }
    }
}

impl From<ReviewFixture> for InMemorySource {
    fn from(fixture: ReviewFixture) -> Self {
        Self { fixture }
    }
}

#[async_trait]
impl ReviewSource for InMemorySource {
    async fn fetch_app_info(
        &self,
        app_id: &str,
        _options: &FetchOptions,
    ) -> Result<AppInfo, SourceError> {
        self.fixture.check_app(app_id)?;
        Ok(self.fixture.app_info.clone())
    }

    async fn fetch_reviews(
        &self,
        app_id: &str,
        options: &FetchOptions,
    ) -> Result<Vec<RawReview>, SourceError> {
        self.fixture.check_app(app_id)?;
        Ok(self.fixture.take_reviews(options.count))
    }
}
