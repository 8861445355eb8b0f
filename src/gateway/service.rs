//! KapowService - the query, feedback and lifecycle entry points.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::auth::{Caller, PostAuthorizer};
use super::query;
use crate::cache::ResultCache;
use crate::engine::Recommender;
use crate::providers::FeedbackSink;
use crate::types::{
    AnalysisRequest, FeedbackRequest, ImageRecord, Settings, SettingsPatch, sanitize_text,
};

/// Recommendation service with caching.
///
/// Nothing here returns an error to the caller: remote and store failures
/// degrade to empty results, dropped feedback is only logged.
pub struct KapowService {
    recommender: Recommender,
    feedback: Arc<dyn FeedbackSink>,
    cache: ResultCache,
    settings: RwLock<Settings>,
    // Bumped under the settings write lock whenever the cache is cleared.
    generation: AtomicU64,
    authorizer: Arc<dyn PostAuthorizer>,
}

impl KapowService {
    pub(crate) fn new(
        recommender: Recommender,
        feedback: Arc<dyn FeedbackSink>,
        cache: ResultCache,
        settings: Settings,
        authorizer: Arc<dyn PostAuthorizer>,
    ) -> Self {
        Self {
            recommender,
            feedback,
            cache,
            settings: RwLock::new(settings.sanitized()),
            generation: AtomicU64::new(0),
            authorizer,
        }
    }

    /// Recommendations for a request, filtered or paginated.
    ///
    /// Served from cache when the text was analysed before; otherwise the
    /// remote is queried and a non-empty result is cached under the post.
    pub async fn analyse(&self, request: &AnalysisRequest) -> Vec<ImageRecord> {
        let records = self.recommendations(request.post_id, &request.text).await;
        let mut selected = query::select(&records, request);
        if request.author_id != 0 {
            for record in &mut selected {
                record.author = request.author_id;
            }
        }
        debug!(
            post_id = request.post_id,
            total = records.len(),
            returned = selected.len(),
            search = request.search.is_some(),
            "analysed"
        );
        selected
    }

    /// Full, unfiltered recommendation list for `text`, cached or fresh.
    pub async fn recommendations(&self, post_id: u64, text: &str) -> Arc<Vec<ImageRecord>> {
        if let Some(records) = self.cache.get(text).await {
            return records;
        }

        let (settings, generation) = {
            let settings = self.settings.read().await;
            (settings.clone(), self.generation.load(Ordering::Acquire))
        };
        let records = Arc::new(self.recommender.recommend(text, &settings).await);

        // Holding the read lock keeps a clear from slipping between the
        // check and the write.
        let _settings = self.settings.read().await;
        if self.generation.load(Ordering::Acquire) == generation {
            self.cache.put(post_id, text, Arc::clone(&records)).await;
        } else {
            debug!(post_id, "cache cleared during lookup, result not cached");
        }
        records
    }

    /// Forward a "liked" signal for an image used in a post.
    ///
    /// Returns whether the signal was sent. Unauthorized callers,
    /// incomplete requests and remote failures all return `false`
    /// without further effect.
    pub async fn register_feedback(&self, caller: &Caller, request: &FeedbackRequest) -> bool {
        if !self.authorizer.can_edit(caller, request.post_id) {
            debug!(post_id = request.post_id, "feedback dropped: caller may not edit post");
            return false;
        }

        let text = sanitize_text(&request.text);
        let url = request.url.trim();
        if text.is_empty() || url.is_empty() {
            debug!(post_id = request.post_id, "feedback dropped: empty text or url");
            return false;
        }

        let settings = self.settings().await;
        match self.feedback.send_feedback(&text, url, true, &settings).await {
            Ok(()) => true,
            Err(e) => {
                warn!(post_id = request.post_id, error = %e, "feedback not delivered");
                false
            }
        }
    }

    pub fn can_edit(&self, caller: &Caller, post_id: u64) -> bool {
        self.authorizer.can_edit(caller, post_id)
    }

    /// Snapshot of the current settings.
    pub async fn settings(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Apply a settings change and clear every cached result.
    pub async fn update_settings(&self, patch: &SettingsPatch) -> Settings {
        let updated = {
            let mut settings = self.settings.write().await;
            settings.apply(patch);
            self.generation.fetch_add(1, Ordering::AcqRel);
            settings.clone()
        };
        info!(settings = ?updated, "settings updated");
        self.cache.invalidate_all().await;
        updated
    }

    /// A post changed status (published, drafted, trashed…): its cached
    /// recommendations are stale.
    pub async fn post_status_changed(&self, post_id: u64) -> bool {
        self.cache.invalidate(post_id).await
    }

    /// Shutdown hook: clear everything this service cached.
    pub async fn deactivate(&self) -> usize {
        info!("deactivating, clearing cache");
        {
            let _settings = self.settings.write().await;
            self.generation.fetch_add(1, Ordering::AcqRel);
        }
        self.cache.invalidate_all().await
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }
}
