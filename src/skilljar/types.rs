use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A lesson as it appears in the course listing.
#[derive(Debug, Clone, Deserialize)]
pub struct Lesson {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
}

impl Lesson {
    pub fn display_title(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| format!("Lesson_{}", self.id))
    }
}

/// The fields of a content item that drive downloads. The item itself is
/// persisted verbatim, this is only a view on it.
#[derive(Debug, Default)]
pub struct ContentItem {
    pub url: Option<String>,
    pub file_url: Option<String>,
    pub content_html: Option<String>,
}

impl ContentItem {
    /// Each field is read on its own; a field of the wrong type is ignored
    /// without hiding the others.
    pub fn from_value(value: &Value) -> Self {
        let field = |name: &str| value.get(name).and_then(Value::as_str).map(str::to_string);
        Self {
            url: field("url"),
            file_url: field("file_url"),
            content_html: field("content_html"),
        }
    }

    /// `url` wins over `file_url` when both are set.
    pub fn direct_url(&self) -> Option<&str> {
        [self.url.as_deref(), self.file_url.as_deref()]
            .into_iter()
            .flatten()
            .find(|url| !url.is_empty())
    }

    pub fn html(&self) -> Option<&str> {
        self.content_html.as_deref().filter(|html| !html.is_empty())
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number id, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lesson_id_accepts_numbers_and_strings() {
        let lesson: Lesson = serde_json::from_value(json!({"id": 42, "title": "Intro"})).unwrap();
        assert_eq!(lesson.id, "42");
        let lesson: Lesson = serde_json::from_value(json!({"id": "abc"})).unwrap();
        assert_eq!(lesson.id, "abc");
        assert_eq!(lesson.display_title(), "Lesson_abc");
    }

    #[test]
    fn lesson_without_id_fails() {
        assert!(serde_json::from_value::<Lesson>(json!({"title": "x"})).is_err());
        assert!(serde_json::from_value::<Lesson>(json!({"id": null})).is_err());
    }

    #[test]
    fn null_title_falls_back() {
        let lesson: Lesson = serde_json::from_value(json!({"id": 7, "title": null})).unwrap();
        assert_eq!(lesson.display_title(), "Lesson_7");
    }

    #[test]
    fn direct_url_prefers_url() {
        let item = ContentItem::from_value(&json!({
            "url": "https://a/video.mp4",
            "file_url": "https://a/file.pdf"
        }));
        assert_eq!(item.direct_url(), Some("https://a/video.mp4"));

        let item = ContentItem::from_value(&json!({"url": "", "file_url": "https://a/file.pdf"}));
        assert_eq!(item.direct_url(), Some("https://a/file.pdf"));

        let item = ContentItem::from_value(&json!({"url": null}));
        assert_eq!(item.direct_url(), None);
    }

    #[test]
    fn mistyped_field_does_not_hide_the_others() {
        let item = ContentItem::from_value(&json!({"url": 12, "content_html": "<img>"}));
        assert_eq!(item.direct_url(), None);
        assert_eq!(item.html(), Some("<img>"));

        let item = ContentItem::from_value(&json!({"url": ["x"], "file_url": "https://a/f.pdf"}));
        assert_eq!(item.direct_url(), Some("https://a/f.pdf"));

        let item = ContentItem::from_value(&json!("not an object"));
        assert_eq!(item.direct_url(), None);
        assert_eq!(item.html(), None);
    }
}
