//! Public types for the Kapow API.

mod image;
mod request;
mod settings;

pub use image::{
    ImageRecord, LARGE_WIDTH, MEDIUM_WIDTH, Orientation, SizeVariant, Sizes, THUMBNAIL_WIDTH,
};
pub use request::{AnalysisRequest, FeedbackRequest, sanitize_text};
pub use settings::{
    DEFAULT_API_KEY, DEFAULT_MIN_TOPIC_SCORE, DEFAULT_PER_PAGE, DEFAULT_THRESHOLD,
    PER_PAGE_RANGE, SCORE_RANGE, Settings, SettingsPatch,
};

/// A keyword inferred from post text by the remote topic model.
pub type Tag = String;
