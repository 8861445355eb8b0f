//! Builder for configuring service instances

use std::sync::Arc;
use std::time::Duration;

use super::KapowService;
use super::auth::{AllowAll, PostAuthorizer};
use crate::Result;
use crate::cache::{CacheConfig, ResultCache, TransientStore};
use crate::engine::{ImageSource, Recommender};
use crate::providers::kapow_api::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::providers::{FeedbackSink, ImageProvider, KapowClient, TagProvider};
use crate::types::Settings;

/// Main entry point for creating service instances.
pub struct Kapow;

impl Kapow {
    /// Create a new builder for configuring the service.
    pub fn builder() -> KapowBuilder {
        KapowBuilder::new()
    }
}

/// Builder for configuring service instances.
///
/// Any provider not set explicitly is served by a [`KapowClient`] built
/// from the base URL, timeout and image source.
pub struct KapowBuilder {
    settings: Settings,
    base_url: String,
    timeout: Duration,
    image_source: ImageSource,
    cache_config: CacheConfig,
    store: Option<Arc<dyn TransientStore>>,
    tag_provider: Option<Arc<dyn TagProvider>>,
    image_provider: Option<Arc<dyn ImageProvider>>,
    feedback_sink: Option<Arc<dyn FeedbackSink>>,
    authorizer: Arc<dyn PostAuthorizer>,
}

impl KapowBuilder {
    pub fn new() -> Self {
        Self {
            settings: Settings::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            image_source: ImageSource::default(),
            cache_config: CacheConfig::default(),
            store: None,
            tag_provider: None,
            image_provider: None,
            feedback_sink: None,
            authorizer: Arc::new(AllowAll),
        }
    }

    /// Initial settings (sanitized on build).
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Shorthand for setting only the API key.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.settings.api_key = api_key.into();
        self
    }

    /// Base URL of the Kapow REST API.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Per-request timeout for remote calls.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Image source requested from the lookup endpoint and credited in
    /// captions.
    pub fn image_source(mut self, source: ImageSource) -> Self {
        self.image_source = source;
        self
    }

    pub fn cache(mut self, config: CacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    /// Use a custom store instead of the in-memory one.
    pub fn store(mut self, store: Arc<dyn TransientStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn tag_provider(mut self, provider: Arc<dyn TagProvider>) -> Self {
        self.tag_provider = Some(provider);
        self
    }

    pub fn image_provider(mut self, provider: Arc<dyn ImageProvider>) -> Self {
        self.image_provider = Some(provider);
        self
    }

    pub fn feedback_sink(mut self, sink: Arc<dyn FeedbackSink>) -> Self {
        self.feedback_sink = Some(sink);
        self
    }

    /// Who may send feedback (default: everyone).
    pub fn authorizer(mut self, authorizer: Arc<dyn PostAuthorizer>) -> Self {
        self.authorizer = authorizer;
        self
    }

    /// Build the service.
    ///
    /// Fails on an invalid cache configuration or if the HTTP client cannot
    /// be constructed.
    pub fn build(self) -> Result<KapowService> {
        let cache = match self.store {
            Some(store) => ResultCache::with_store(store, &self.cache_config)?,
            None => ResultCache::new(&self.cache_config)?,
        };

        let client = Arc::new(KapowClient::with_options(
            &self.base_url,
            self.timeout,
            &self.image_source.name,
        )?);

        let tags = self
            .tag_provider
            .unwrap_or_else(|| Arc::clone(&client) as Arc<dyn TagProvider>);
        let images = self
            .image_provider
            .unwrap_or_else(|| Arc::clone(&client) as Arc<dyn ImageProvider>);
        let feedback = self
            .feedback_sink
            .unwrap_or_else(|| client as Arc<dyn FeedbackSink>);

        let recommender = Recommender::new(tags, images, self.image_source);

        Ok(KapowService::new(
            recommender,
            feedback,
            cache,
            self.settings,
            self.authorizer,
        ))
    }
}

impl Default for KapowBuilder {
    fn default() -> Self {
        Self::new()
    }
}
