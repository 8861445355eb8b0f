//! Recommendation engine: text → tags → images → records.
//!
//! The engine has no cache of its own; identical text and settings always
//! produce identical remote calls. Caching belongs to
//! [`ResultCache`](crate::cache::ResultCache).

pub mod mapping;

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use crate::providers::{ImageProvider, TagProvider};
use crate::telemetry;
use crate::types::{ImageRecord, Settings};

pub use mapping::{ImageSource, to_record};

/// Orchestrates the tag and image lookups and normalizes the results.
pub struct Recommender {
    tags: Arc<dyn TagProvider>,
    images: Arc<dyn ImageProvider>,
    source: ImageSource,
}

impl Recommender {
    pub fn new(
        tags: Arc<dyn TagProvider>,
        images: Arc<dyn ImageProvider>,
        source: ImageSource,
    ) -> Self {
        Self {
            tags,
            images,
            source,
        }
    }

    pub fn source(&self) -> &ImageSource {
        &self.source
    }

    /// Recommend images for `text`.
    ///
    /// Returns an empty vec when no tags are found (the image lookup is then
    /// skipped entirely) or when the image lookup yields nothing. Raw images
    /// that cannot be mapped are dropped individually.
    pub async fn recommend(&self, text: &str, settings: &Settings) -> Vec<ImageRecord> {
        let tags = self.tags.fetch_tags(text, settings).await.into_items();
        if tags.is_empty() {
            debug!(provider = self.tags.name(), "no tags for text");
            return Vec::new();
        }
        debug!(?tags, "tags extracted");

        let raw_images = self.images.fetch_images(&tags, settings).await.into_items();
        if raw_images.is_empty() {
            debug!(provider = self.images.name(), "no images for tags");
            return Vec::new();
        }

        let now = Utc::now();
        let total = raw_images.len();
        let records: Vec<ImageRecord> = raw_images
            .into_iter()
            .enumerate()
            .filter_map(|(index, raw)| match to_record(raw, &self.source, now) {
                Ok(record) => Some(record),
                Err(e) => {
                    debug!(index, error = %e, "skipping malformed image");
                    metrics::counter!(telemetry::RECORDS_SKIPPED_TOTAL).increment(1);
                    None
                }
            })
            .collect();

        debug!(total, kept = records.len(), "images mapped");
        records
    }
}
