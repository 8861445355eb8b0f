//! Normalized image records, shaped like media-library attachments.

use serde::{Deserialize, Serialize};

/// Target widths for the scaled size variants.
pub const THUMBNAIL_WIDTH: f64 = 200.0;
pub const MEDIUM_WIDTH: f64 = 400.0;
pub const LARGE_WIDTH: f64 = 1080.0;

/// Image orientation as reported to the picker UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Landscape,
    Portrait,
}

impl Orientation {
    /// Portrait only when strictly taller than wide.
    pub fn from_dimensions(width: f64, height: f64) -> Self {
        if height > width {
            Orientation::Portrait
        } else {
            Orientation::Landscape
        }
    }
}

/// One rendition of an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeVariant {
    pub url: String,
    pub height: f64,
    pub width: f64,
    pub orientation: Orientation,
}

impl SizeVariant {
    /// Scale a source of `source_width`x`source_height` to `target_width`,
    /// keeping the aspect ratio.
    pub fn scaled(
        url: impl Into<String>,
        source_width: f64,
        source_height: f64,
        target_width: f64,
    ) -> Self {
        Self {
            url: url.into(),
            height: source_height / source_width * target_width,
            width: target_width,
            orientation: Orientation::from_dimensions(source_width, source_height),
        }
    }
}

/// The four renditions the picker expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sizes {
    pub thumbnail: SizeVariant,
    pub medium: SizeVariant,
    pub large: SizeVariant,
    pub full: SizeVariant,
}

/// A recommended image.
///
/// Field names serialize in camelCase so the record can stand in for a
/// native attachment object. Built once per cache fill and never mutated
/// while cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    pub id: String,
    pub title: String,
    pub filename: String,
    pub url: String,
    pub link: String,
    pub alt: String,
    /// Id of the user the record is presented to (0 when unknown).
    pub author: u64,
    pub description: String,
    /// Attribution HTML.
    pub caption: String,
    pub name: String,
    pub status: String,
    pub uploaded_to: u64,
    /// Unix seconds.
    pub date: i64,
    pub modified: i64,
    pub menu_order: u32,
    pub mime: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub subtype: String,
    pub icon: String,
    pub date_formatted: String,
    pub height: f64,
    pub width: f64,
    pub orientation: Orientation,
    pub sizes: Sizes,
}

impl ImageRecord {
    /// Text searched by the query filter: title, alt and description,
    /// lower-cased and space-joined.
    pub fn haystack(&self) -> String {
        format!("{} {} {}", self.title, self.alt, self.description).to_lowercase()
    }
}
