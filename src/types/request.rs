//! Incoming query and feedback requests.

use scraper::{Html, Node};
use serde::{Deserialize, Serialize};

/// A recommendation query for one post.
///
/// `page` is 1-based. `search`, when present (including empty), switches
/// the query from pagination to filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub post_id: u64,
    pub text: String,
    pub page: i64,
    pub page_size: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// User the results are presented to; stamped on each record.
    #[serde(default)]
    pub author_id: u64,
}

impl AnalysisRequest {
    /// First page of `page_size` results for `text`.
    pub fn new(post_id: u64, text: impl Into<String>) -> Self {
        Self {
            post_id,
            text: text.into(),
            page: 1,
            page_size: 40,
            search: None,
            author_id: 0,
        }
    }

    pub fn page(mut self, page: i64, page_size: i64) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn author(mut self, author_id: u64) -> Self {
        self.author_id = author_id;
        self
    }
}

/// Signal that a recommended image was used in a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub post_id: u64,
    pub text: String,
    pub url: String,
}

/// Strip HTML tags and collapse runs of whitespace.
///
/// Text inside `<script>` and `<style>` elements is dropped. A `<` that
/// does not open a tag is kept as text.
pub fn sanitize_text(input: &str) -> String {
    let fragment = Html::parse_fragment(input);
    let mut out = String::with_capacity(input.len());

    for node in fragment.tree.nodes() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            matches!(ancestor.value(), Node::Element(el) if matches!(el.name(), "script" | "style"))
        });
        if !hidden {
            out.push_str(text);
            out.push(' ');
        }
    }

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_collapses_whitespace() {
        let text = "<p>A red   <b>sunset</b></p>\n<p>over mountains</p>";
        assert_eq!(sanitize_text(text), "A red sunset over mountains");
    }

    #[test]
    fn drops_script_and_style_bodies() {
        let text = "before<script>alert('x')</script> after<style>p{}</style>";
        assert_eq!(sanitize_text(text), "before after");
    }

    #[test]
    fn unterminated_tag_is_dropped() {
        assert_eq!(sanitize_text("hello <b"), "hello");
    }

    #[test]
    fn comparison_signs_survive() {
        assert_eq!(
            sanitize_text("if x < 5 and y > 3 then go"),
            "if x < 5 and y > 3 then go"
        );
        assert_eq!(sanitize_text("<p>a < b</p>"), "a < b");
    }

    #[test]
    fn entities_are_decoded() {
        assert_eq!(sanitize_text("fish &amp; chips"), "fish & chips");
    }

    #[test]
    fn plain_text_unchanged() {
        assert_eq!(sanitize_text("plain text"), "plain text");
    }

    #[test]
    fn builder_sets_fields() {
        let req = AnalysisRequest::new(7, "text")
            .page(2, 10)
            .search("car")
            .author(3);
        assert_eq!(req.page, 2);
        assert_eq!(req.page_size, 10);
        assert_eq!(req.search.as_deref(), Some("car"));
        assert_eq!(req.author_id, 3);
    }
}
