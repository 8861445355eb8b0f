//! Model settings: API key and the three tunable model parameters.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Placeholder API key used until an administrator configures one.
pub const DEFAULT_API_KEY: &str = "kapow-public-demo-key";

pub const DEFAULT_THRESHOLD: f64 = 0.9;
pub const DEFAULT_MIN_TOPIC_SCORE: f64 = 0.9;
pub const DEFAULT_PER_PAGE: u32 = 5;

/// Allowed range for `threshold` and `min_topic_score`.
pub const SCORE_RANGE: (f64, f64) = (0.5, 1.0);
/// Allowed range for `per_page` (images per keyword).
pub const PER_PAGE_RANGE: (u32, u32) = (1, 10);

/// Settings passed to the API client on every call.
///
/// Always held in sanitized form: construct through [`Settings::new`] or
/// apply changes through [`Settings::apply`].
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub api_key: String,
    pub threshold: f64,
    pub min_topic_score: f64,
    pub per_page: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: DEFAULT_API_KEY.to_string(),
            threshold: DEFAULT_THRESHOLD,
            min_topic_score: DEFAULT_MIN_TOPIC_SCORE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

// Keep the API key out of logs.
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &"<redacted>")
            .field("threshold", &self.threshold)
            .field("min_topic_score", &self.min_topic_score)
            .field("per_page", &self.per_page)
            .finish()
    }
}

impl Settings {
    /// Build sanitized settings.
    pub fn new(
        api_key: impl Into<String>,
        threshold: f64,
        min_topic_score: f64,
        per_page: u32,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            threshold,
            min_topic_score,
            per_page,
        }
        .sanitized()
    }

    /// Clamp every numeric parameter into its allowed range.
    ///
    /// A non-finite score falls back to its default.
    pub fn sanitized(mut self) -> Self {
        self.threshold = clamp_score(self.threshold, DEFAULT_THRESHOLD);
        self.min_topic_score = clamp_score(self.min_topic_score, DEFAULT_MIN_TOPIC_SCORE);
        self.per_page = self.per_page.clamp(PER_PAGE_RANGE.0, PER_PAGE_RANGE.1);
        if self.api_key.trim().is_empty() {
            self.api_key = DEFAULT_API_KEY.to_string();
        }
        self
    }

    /// Apply a partial update. Only fields present in `patch` change.
    pub fn apply(&mut self, patch: &SettingsPatch) {
        if let Some(ref key) = patch.api_key {
            self.api_key = key.trim().to_string();
        }
        if let Some(threshold) = patch.threshold {
            self.threshold = threshold;
        }
        if let Some(score) = patch.min_topic_score {
            self.min_topic_score = score;
        }
        if let Some(per_page) = patch.per_page {
            self.per_page = per_page.unsigned_abs().min(u64::from(u32::MAX)) as u32;
        }
        *self = std::mem::take(self).sanitized();
    }

    /// Whether the API key is still the shipped placeholder.
    pub fn uses_default_key(&self) -> bool {
        self.api_key == DEFAULT_API_KEY
    }
}

/// A partial settings update, as submitted from a settings form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_topic_score: Option<f64>,
    /// Signed so that a negative form value can be normalized like the
    /// absolute-integer sanitizer forms use.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page: Option<i64>,
}

fn clamp_score(value: f64, default: f64) -> f64 {
    if value.is_finite() {
        value.clamp(SCORE_RANGE.0, SCORE_RANGE.1)
    } else {
        default
    }
}
