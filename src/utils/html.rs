//! HTML text helpers.

use scraper::{Html, Selector};

/// Escape text content for serialization back into HTML.
pub fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape an attribute value for a double-quoted attribute.
pub fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;").replace('"', "&quot;")
}

/// Return the trimmed `<title>` text of a document, if present and non-empty.
pub fn extract_title(html: &str) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    let document = Html::parse_document(html);
    let title = document
        .select(&selector)
        .next()?
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("hello"), "hello");
        assert_eq!(escape_text("<script>"), "&lt;script&gt;");
        assert_eq!(escape_text("a & b"), "a &amp; b");
    }

    #[test]
    fn test_escape_attr() {
        assert_eq!(escape_attr("say \"hi\" & bye"), "say &quot;hi&quot; &amp; bye");
        assert_eq!(escape_attr("<ok>"), "<ok>");
    }

    #[test]
    fn test_extract_title() {
        let html = "<html><head><title>\n  Sign in  to  Example\n</title></head></html>";
        assert_eq!(extract_title(html).as_deref(), Some("Sign in to Example"));
    }

    #[test]
    fn test_extract_title_missing_or_blank() {
        assert_eq!(extract_title("<html><body>x</body></html>"), None);
        assert_eq!(extract_title("<title>   </title>"), None);
    }
}
