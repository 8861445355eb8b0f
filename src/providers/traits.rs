//! Provider traits for the three remote capabilities.
//!
//! The recommendation engine and the service depend on these traits rather
//! than on [`KapowClient`](super::KapowClient), so tests can swap in
//! counting mocks and a different backend can be plugged in later.
//!
//! Tag and image lookups never return `Err`: failures come back as
//! [`ApiOutcome::Failed`] and read as "no results" upstream.

use async_trait::async_trait;

use super::outcome::ApiOutcome;
use super::schema::RawImage;
use crate::Result;
use crate::types::{Settings, Tag};

/// Extracts keywords from text.
#[async_trait]
pub trait TagProvider: Send + Sync {
    /// Provider name for logging/debugging.
    fn name(&self) -> &str;

    async fn fetch_tags(&self, text: &str, settings: &Settings) -> ApiOutcome<Tag>;
}

/// Looks up candidate images for a set of keywords.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Provider name for logging/debugging.
    fn name(&self) -> &str;

    async fn fetch_images(&self, tags: &[Tag], settings: &Settings) -> ApiOutcome<RawImage>;
}

/// Receives like/dislike signals for recommended images.
///
/// Best-effort: callers log errors and move on.
#[async_trait]
pub trait FeedbackSink: Send + Sync {
    async fn send_feedback(
        &self,
        text: &str,
        url: &str,
        liked: bool,
        settings: &Settings,
    ) -> Result<()>;
}
