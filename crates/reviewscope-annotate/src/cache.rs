//! Memoizing wrapper that makes any annotator idempotent per input text.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::annotator::{Annotation, Annotator};
use crate::error::AnnotationError;

/// Caches successful annotations keyed by SHA-256 of the review text.
///
/// Repeated text returns the first stored result without calling the inner
/// annotator again. Failures are never cached, so a later call can still
/// succeed.
pub struct CachedAnnotator<A> {
    inner: A,
    cache: Mutex<HashMap<[u8; 32], Annotation>>,
}

impl<A: Annotator> CachedAnnotator<A> {
    #[must_use]
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Number of distinct texts cached so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn cache_key(text: &str) -> [u8; 32] {
    Sha256::digest(text.as_bytes()).into()
}

#[async_trait]
impl<A: Annotator> Annotator for CachedAnnotator<A> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn annotate(&self, text: &str) -> Result<Annotation, AnnotationError> {
        let key = cache_key(text);
        let cached = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned();
        if let Some(hit) = cached {
            return Ok(hit);
        }

        let fresh = self.inner.annotate(text).await?;
        let stored = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key)
            .or_insert(fresh)
            .clone();
        Ok(stored)
    }
}
