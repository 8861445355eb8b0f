//! Wire schema for the Kapow REST API.
//!
//! Request bodies borrow from the caller. Response types make every field
//! optional: deciding which fields are required happens when a raw image is
//! turned into an [`ImageRecord`](crate::types::ImageRecord), so one bad
//! object never fails the whole response.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::Tag;

#[derive(Serialize)]
pub(crate) struct TaskRequest<'a> {
    pub model: &'a str,
    pub payload: TaskPayload<'a>,
}

#[derive(Serialize)]
pub(crate) struct TaskPayload<'a> {
    pub text: &'a str,
    pub threshold: f64,
    pub min_topic_score: f64,
    pub default_to_topics: bool,
}

#[derive(Deserialize)]
pub(crate) struct TaskResponse {
    #[serde(default)]
    pub output: Option<Vec<TagItem>>,
}

#[derive(Deserialize)]
pub(crate) struct TagItem {
    #[serde(default)]
    pub tag: Option<String>,
}

impl TaskResponse {
    /// Non-blank tags, in response order.
    pub fn into_tags(self) -> Vec<Tag> {
        self.output
            .unwrap_or_default()
            .into_iter()
            .filter_map(|item| item.tag)
            .filter(|tag| !tag.trim().is_empty())
            .collect()
    }
}

#[derive(Serialize)]
pub(crate) struct ImagesRequest<'a> {
    pub source: &'a str,
    pub keywords: &'a [Tag],
    pub options: ImagesOptions,
}

#[derive(Serialize)]
pub(crate) struct ImagesOptions {
    pub per_page: u32,
}

#[derive(Serialize)]
pub(crate) struct FeedbackBody<'a> {
    pub model: &'a str,
    pub text: &'a str,
    pub url: &'a str,
    pub like: u8,
}

/// A candidate image exactly as the remote returned it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawImage {
    /// String or numeric identifier.
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
    /// Full-size image URL.
    #[serde(default)]
    pub url: Option<String>,
    /// Page on the source site.
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub thumb: Option<String>,
    #[serde(default)]
    pub small: Option<String>,
    #[serde(default)]
    pub regular: Option<String>,
    /// Author profile URL.
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

impl RawImage {
    /// Decode one element of an images response.
    ///
    /// Elements that are not objects, or whose fields have the wrong type,
    /// decode to an empty `RawImage` that will fail record mapping.
    pub(crate) fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }

    /// The identifier as a string, if present and scalar.
    pub fn id_string(&self) -> Option<String> {
        match self.id.as_ref()? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Loose truthiness of a decoded response body.
///
/// `null`, `false`, `0`, `""` and `[]` count as "no response".
pub(crate) fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(a) => a.is_empty(),
        Value::Object(_) => false,
    }
}
