//! Kapow REST API client for tag extraction, image lookup and feedback.
//!
//! Every request is a JSON `POST` carrying `Authorization: Bearer <key>`,
//! where the key comes from the [`Settings`] passed to each call.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, redirect};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::outcome::ApiOutcome;
use super::schema::{
    FeedbackBody, ImagesOptions, ImagesRequest, RawImage, TaskPayload, TaskRequest, TaskResponse,
    is_falsy,
};
use super::traits::{FeedbackSink, ImageProvider, TagProvider};
use crate::telemetry;
use crate::types::{Settings, Tag};
use crate::{KapowError, Result};

/// Default base URL for the Kapow REST API.
pub const DEFAULT_BASE_URL: &str = "https://kapow.brightminded.ai/api/v1.0";

/// Per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(45);

/// Topic model used for tag extraction and feedback.
pub const MODEL_NAME: &str = "TopicTagSim";

/// Image provider the lookup endpoint is asked to search.
pub const DEFAULT_IMAGE_SOURCE: &str = "Unsplash";

const MAX_REDIRECTS: usize = 5;

const TASK_ROUTE: &str = "task";
const IMAGES_ROUTE: &str = "images";
const FEEDBACK_ROUTE: &str = "images/feedback";

/// Client for the Kapow REST API.
#[derive(Clone)]
pub struct KapowClient {
    http: Client,
    base_url: String,
    image_source: String,
}

impl KapowClient {
    /// Client for the public API with default timeout and image source.
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Self::with_options(base_url, DEFAULT_TIMEOUT, DEFAULT_IMAGE_SOURCE)
    }

    pub fn with_options(
        base_url: impl Into<String>,
        timeout: Duration,
        image_source: impl Into<String>,
    ) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(KapowError::InvalidInput("base URL must not be empty".into()));
        }

        let http = Client::builder()
            .timeout(timeout)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| KapowError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url,
            image_source: image_source.into(),
        })
    }

    /// Image source name sent with every lookup.
    pub fn image_source(&self) -> &str {
        &self.image_source
    }

    /// Ask the topic model for keywords describing `text`.
    pub async fn fetch_tags(&self, text: &str, settings: &Settings) -> ApiOutcome<Tag> {
        let body = TaskRequest {
            model: MODEL_NAME,
            payload: TaskPayload {
                text,
                threshold: settings.threshold,
                min_topic_score: settings.min_topic_score,
                default_to_topics: false,
            },
        };

        let outcome = match self.post_json(TASK_ROUTE, &settings.api_key, &body).await {
            Err(e) => ApiOutcome::Failed(e),
            Ok(None) => ApiOutcome::Empty,
            Ok(Some(value)) => match serde_json::from_value::<TaskResponse>(value) {
                Ok(response) => ApiOutcome::from_items(response.into_tags()),
                Err(e) => ApiOutcome::Failed(KapowError::MalformedResponse(format!(
                    "task response: {e}"
                ))),
            },
        };

        record_outcome(TASK_ROUTE, &outcome);
        outcome
    }

    /// Look up candidate images for `tags`.
    pub async fn fetch_images(&self, tags: &[Tag], settings: &Settings) -> ApiOutcome<RawImage> {
        let body = ImagesRequest {
            source: &self.image_source,
            keywords: tags,
            options: ImagesOptions {
                per_page: settings.per_page,
            },
        };

        let outcome = match self.post_json(IMAGES_ROUTE, &settings.api_key, &body).await {
            Err(e) => ApiOutcome::Failed(e),
            Ok(None) => ApiOutcome::Empty,
            Ok(Some(Value::Array(items))) => {
                ApiOutcome::from_items(items.into_iter().map(RawImage::from_value).collect())
            }
            Ok(Some(other)) => ApiOutcome::Failed(KapowError::MalformedResponse(format!(
                "images response is not an array: {}",
                json_kind(&other)
            ))),
        };

        record_outcome(IMAGES_ROUTE, &outcome);
        outcome
    }

    /// Tell the model whether a recommended image was liked.
    pub async fn send_feedback(
        &self,
        text: &str,
        url: &str,
        liked: bool,
        settings: &Settings,
    ) -> Result<()> {
        let body = FeedbackBody {
            model: MODEL_NAME,
            text,
            url,
            like: u8::from(liked),
        };

        let result = self
            .post_json(FEEDBACK_ROUTE, &settings.api_key, &body)
            .await
            .map(|_| ());

        let status = if result.is_ok() { "ok" } else { "error" };
        metrics::counter!(
            telemetry::REQUESTS_TOTAL,
            "endpoint" => FEEDBACK_ROUTE,
            "status" => status
        )
        .increment(1);

        result
    }

    /// POST `body` to `route` and decode the response body as JSON.
    ///
    /// Returns `Ok(None)` for an empty or falsy body.
    async fn post_json<B: Serialize + ?Sized>(
        &self,
        route: &'static str,
        api_key: &str,
        body: &B,
    ) -> Result<Option<Value>> {
        let url = format!("{}/{}", self.base_url, route);
        let start = Instant::now();

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .json(body)
            .send()
            .await;

        metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS, "endpoint" => route)
            .record(start.elapsed().as_secs_f64());

        let response = response?;
        handle_response_errors(&response)?;

        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            debug!(route, "empty response body");
            return Ok(None);
        }

        let value: Value = serde_json::from_slice(&bytes)?;
        Ok((!is_falsy(&value)).then_some(value))
    }
}

/// Check response status and map to appropriate error.
fn handle_response_errors(response: &reqwest::Response) -> Result<()> {
    let status = response.status();

    if status.is_success() {
        return Ok(());
    }

    match status.as_u16() {
        401 | 403 => Err(KapowError::AuthenticationFailed),
        429 => {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs);
            Err(KapowError::RateLimited { retry_after })
        }
        code => Err(KapowError::Api {
            status: code,
            message: format!("Kapow API error: {status}"),
        }),
    }
}

fn record_outcome<T>(route: &'static str, outcome: &ApiOutcome<T>) {
    metrics::counter!(
        telemetry::REQUESTS_TOTAL,
        "endpoint" => route,
        "status" => outcome.status_label()
    )
    .increment(1);

    if let ApiOutcome::Failed(e) = outcome {
        warn!(route, error = %e, transient = e.is_transient(), "Kapow API request failed");
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// Provider Trait Implementations
// ============================================================================

#[async_trait]
impl TagProvider for KapowClient {
    fn name(&self) -> &str {
        "kapow"
    }

    async fn fetch_tags(&self, text: &str, settings: &Settings) -> ApiOutcome<Tag> {
        KapowClient::fetch_tags(self, text, settings).await
    }
}

#[async_trait]
impl ImageProvider for KapowClient {
    fn name(&self) -> &str {
        "kapow"
    }

    async fn fetch_images(&self, tags: &[Tag], settings: &Settings) -> ApiOutcome<RawImage> {
        KapowClient::fetch_images(self, tags, settings).await
    }
}

#[async_trait]
impl FeedbackSink for KapowClient {
    async fn send_feedback(
        &self,
        text: &str,
        url: &str,
        liked: bool,
        settings: &Settings,
    ) -> Result<()> {
        KapowClient::send_feedback(self, text, url, liked, settings).await
    }
}
