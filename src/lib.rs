//! Kapow - image recommendations for post text
//!
//! This crate sends post text to the Kapow topic model, turns the returned
//! tags into image lookups, and normalizes the results into media-library
//! records. Results are cached per text, indexed by post so a post's
//! entry can be dropped when it changes.
//!
//! # Example
//!
//! ```rust,no_run
//! use kapow::{AnalysisRequest, Kapow};
//!
//! #[tokio::main]
//! async fn main() -> kapow::Result<()> {
//!     let service = Kapow::builder()
//!         .api_key("your-kapow-key")
//!         .build()?;
//!
//!     let request = AnalysisRequest::new(42, "A red sunset over mountains").page(1, 10);
//!     for image in service.analyse(&request).await {
//!         println!("{} ({}x{})", image.url, image.width, image.height);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod providers;
#[cfg(feature = "server")]
pub mod server;
pub mod telemetry;
pub mod types;
pub mod version;

// Re-export main types at crate root
pub use error::{KapowError, Result};
pub use gateway::{Caller, Kapow, KapowBuilder, KapowService};
pub use version::{PKG_VERSION, version_string};

// Re-export all types
pub use types::{
    AnalysisRequest, FeedbackRequest, ImageRecord, Orientation, Settings, SettingsPatch,
    SizeVariant, Sizes, Tag,
};
