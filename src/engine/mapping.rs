//! Raw image → [`ImageRecord`] mapping.

use chrono::{DateTime, Utc};

use crate::providers::RawImage;
use crate::types::{
    ImageRecord, LARGE_WIDTH, MEDIUM_WIDTH, Orientation, SizeVariant, Sizes, THUMBNAIL_WIDTH,
};
use crate::{KapowError, Result};

const UTM: &str = "utm_source=kapow&utm_medium=referral";

/// Where recommended images come from, for attribution.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSource {
    pub name: String,
    pub homepage: String,
}

impl Default for ImageSource {
    fn default() -> Self {
        Self {
            name: crate::providers::DEFAULT_IMAGE_SOURCE.to_string(),
            homepage: "https://unsplash.com/".to_string(),
        }
    }
}

impl ImageSource {
    pub fn new(name: impl Into<String>, homepage: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            homepage: homepage.into(),
        }
    }

    /// Attribution HTML crediting `username` (profile at `author_url`).
    pub fn attribution(&self, author_url: &str, username: &str) -> String {
        format!(
            "Photo by <a href='{author_url}?{UTM}' target='_blank' rel='noopener'>{username}</a> \
             on <a href='{}?{UTM}' target='_blank' rel='noopener'>{}</a>",
            self.homepage, self.name
        )
    }
}

/// Build a record from a raw image. Fails on the first missing field.
pub fn to_record(raw: RawImage, source: &ImageSource, now: DateTime<Utc>) -> Result<ImageRecord> {
    let id = raw.id_string().ok_or(KapowError::MissingField("id"))?;
    let width = raw.width.ok_or(KapowError::MissingField("width"))?;
    let height = raw.height.ok_or(KapowError::MissingField("height"))?;
    if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
        return Err(KapowError::InvalidDimensions { width, height });
    }

    let description = required(raw.description, "description")?;
    let alt = required(raw.alt, "alt")?;
    let url = required(raw.url, "url")?;
    let link = required(raw.link, "link")?;
    let thumb = required(raw.thumb, "thumb")?;
    let small = required(raw.small, "small")?;
    let regular = required(raw.regular, "regular")?;
    let author = required(raw.author, "author")?;
    let username = required(raw.username, "username")?;

    let orientation = Orientation::from_dimensions(width, height);
    let timestamp = now.timestamp();

    Ok(ImageRecord {
        id,
        title: description.clone(),
        filename: description.clone(),
        link,
        alt,
        author: 0,
        caption: source.attribution(&author, &username),
        name: description.clone(),
        description,
        status: "inherit".to_string(),
        uploaded_to: 0,
        date: timestamp,
        modified: timestamp,
        menu_order: 0,
        mime: "image/png".to_string(),
        kind: "image".to_string(),
        subtype: "png".to_string(),
        icon: thumb.clone(),
        date_formatted: now.format("%a %b %Y").to_string(),
        height,
        width,
        orientation,
        sizes: Sizes {
            thumbnail: SizeVariant::scaled(thumb, width, height, THUMBNAIL_WIDTH),
            medium: SizeVariant::scaled(small, width, height, MEDIUM_WIDTH),
            large: SizeVariant::scaled(regular, width, height, LARGE_WIDTH),
            full: SizeVariant {
                url: url.clone(),
                height,
                width,
                orientation,
            },
        },
        url,
    })
}

fn required(value: Option<String>, field: &'static str) -> Result<String> {
    value.ok_or(KapowError::MissingField(field))
}
