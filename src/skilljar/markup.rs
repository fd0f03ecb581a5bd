use std::sync::LazyLock;

use regex::Regex;

/// One pattern per referencing element, in the order their matches are
/// reported. `src` of media elements first, then anchors whose target ends
/// in a document or archive extension.
static PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r#"(?i)<img[^>]+src=["']([^"']+)["']"#,
        r#"(?i)<video[^>]+src=["']([^"']+)["']"#,
        r#"(?i)<audio[^>]+src=["']([^"']+)["']"#,
        r#"(?i)<source[^>]+src=["']([^"']+)["']"#,
        r#"(?i)<embed[^>]+src=["']([^"']+)["']"#,
        r#"(?i)<iframe[^>]+src=["']([^"']+)["']"#,
        r#"(?i)<a[^>]+href=["']([^"']+\.(?:pdf|doc|docx|xls|xlsx|ppt|pptx|zip|rar))["']"#,
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("Invalid asset regex"))
    .collect()
});

/// Collects absolute asset URLs referenced from an HTML fragment.
///
/// Attributes are matched textually, so references inside `noscript`,
/// `textarea`, scripts or comments count as well and broken nesting does not
/// matter. All `img` sources come first, then `video`, `audio`, `source`,
/// `embed` and `iframe` sources, then document links; within each group
/// matches keep document order. Relative and protocol-relative references are
/// dropped.
pub fn extract_asset_urls(html: &str) -> Vec<String> {
    if html.is_empty() {
        return Vec::new();
    }

    PATTERNS
        .iter()
        .flat_map(|pattern| pattern.captures_iter(html))
        .filter_map(|captures| captures.get(1))
        .map(|url| url.as_str())
        .filter(|url| is_absolute(url))
        .map(str::to_string)
        .collect()
}

fn is_absolute(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_then_document_link() {
        let html = r#"<img src="https://a/1.png"><a href="https://a/doc.pdf">x</a>"#;
        assert_eq!(
            extract_asset_urls(html),
            vec!["https://a/1.png", "https://a/doc.pdf"]
        );
    }

    #[test]
    fn relative_and_protocol_relative_sources_are_dropped() {
        let html = r#"
            <img src="/local.png">
            <img src="//cdn.example.com/x.png">
            <img src="images/y.png">
            <img src="https://cdn.example.com/z.png">
        "#;
        assert_eq!(extract_asset_urls(html), vec!["https://cdn.example.com/z.png"]);
    }

    #[test]
    fn groups_follow_tag_order_not_document_order() {
        let html = r#"
            <a href="https://a/notes.PDF">notes</a>
            <iframe src="https://player/embed/1"></iframe>
            <video src="https://a/clip.mp4"></video>
            <img src="https://a/first.png">
            <audio src="https://a/track.mp3"></audio>
            <video><source src="https://a/alt.webm"></video>
            <embed src="https://a/applet.swf">
            <img src="https://a/second.png">
        "#;
        assert_eq!(
            extract_asset_urls(html),
            vec![
                "https://a/first.png",
                "https://a/second.png",
                "https://a/clip.mp4",
                "https://a/track.mp3",
                "https://a/alt.webm",
                "https://a/applet.swf",
                "https://player/embed/1",
                "https://a/notes.PDF",
            ]
        );
    }

    #[test]
    fn anchors_need_a_document_extension() {
        let html = r#"
            <a href="https://a/page.html">page</a>
            <a href="https://a/archive.zip">zip</a>
            <a href="https://a/sheet.XlSx">sheet</a>
            <a href="https://a/download">no extension</a>
            <a href="/relative/slides.pptx">relative</a>
        "#;
        assert_eq!(
            extract_asset_urls(html),
            vec!["https://a/archive.zip", "https://a/sheet.XlSx"]
        );
    }

    #[test]
    fn tolerates_broken_markup() {
        let html = r#"<div><p><img src="https://a/broken.png"</p><video src='https://a/v.mp4'>"#;
        assert_eq!(
            extract_asset_urls(html),
            vec!["https://a/broken.png", "https://a/v.mp4"]
        );
    }

    #[test]
    fn raw_text_and_commented_markup_is_scanned() {
        let html = r#"
            <noscript><img src="https://a/real.png"></noscript>
            <textarea><img src="https://a/t.png"></textarea>
            <!-- <a href="https://a/old.pdf">old</a> -->
        "#;
        assert_eq!(
            extract_asset_urls(html),
            vec!["https://a/real.png", "https://a/t.png", "https://a/old.pdf"]
        );
    }

    #[test]
    fn anchor_with_query_after_extension_is_ignored() {
        let html = r#"<a href="https://a/doc.pdf?dl=1">doc</a>"#;
        assert!(extract_asset_urls(html).is_empty());
    }

    #[test]
    fn extraction_is_repeatable() {
        let html = r#"<img src="https://a/1.png"><audio src="http://a/2.mp3"></audio>"#;
        assert_eq!(extract_asset_urls(html), extract_asset_urls(html));
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(extract_asset_urls("").is_empty());
        assert!(extract_asset_urls("<p>just text</p>").is_empty());
    }
}
