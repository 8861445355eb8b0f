//! Remote API access.
//!
//! - [`KapowClient`] talks to the Kapow REST API.
//! - [`traits`] defines the capability seams the engine depends on.
//! - [`ApiOutcome`] keeps "empty" and "failed" lookups distinguishable.

pub mod kapow_api;
pub mod outcome;
pub mod schema;
pub mod traits;

pub use kapow_api::{DEFAULT_BASE_URL, DEFAULT_IMAGE_SOURCE, KapowClient, MODEL_NAME};
pub use outcome::ApiOutcome;
pub use schema::RawImage;
pub use traits::{FeedbackSink, ImageProvider, TagProvider};
