//! Rendering decision for statically fetched pages.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::config::SpaHeuristicConfig;

/// Signals computed from a static page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpaSignals {
    pub framework_signs: bool,
    pub minimal_content: bool,
    pub login_intent: bool,
}

impl SpaSignals {
    /// Framework signs or thin content only count together with login intent.
    pub fn should_render(&self) -> bool {
        (self.framework_signs && self.login_intent) || (self.minimal_content && self.login_intent)
    }
}

/// Evaluate the three signals for `html` fetched from `url`.
pub fn evaluate(html: &str, url: &str, config: &SpaHeuristicConfig) -> SpaSignals {
    let html_lower = html.to_lowercase();
    let url_lower = url.to_lowercase();

    let framework_signs = config
        .framework_signs
        .iter()
        .any(|sign| html_lower.contains(&sign.to_lowercase()));

    let text_chars = visible_char_count(html);
    let minimal_content = text_chars < config.minimal_content_threshold;

    let login_intent = config.login_keywords.iter().any(|keyword| {
        let keyword = keyword.to_lowercase();
        url_lower.contains(&keyword) || html_lower.contains(&keyword)
    });

    let signals = SpaSignals {
        framework_signs,
        minimal_content,
        login_intent,
    };
    debug!(
        "SPA signals for {}: framework={}, minimal={} ({} chars), login_intent={}",
        url, framework_signs, minimal_content, text_chars, login_intent
    );
    signals
}

/// Decide whether a rendered fetch is warranted.
pub fn should_render(html: &str, url: &str, config: &SpaHeuristicConfig) -> bool {
    evaluate(html, url, config).should_render()
}

static TAG_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"<[^>]+>").ok());

/// Count characters outside of tags, ignoring surrounding whitespace.
fn visible_char_count(html: &str) -> usize {
    match TAG_PATTERN.as_ref() {
        Some(tags) => tags.replace_all(html, "").trim().chars().count(),
        None => html.trim().chars().count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SpaHeuristicConfig {
        SpaHeuristicConfig::default()
    }

    #[test]
    fn test_visible_char_count_strips_tags() {
        assert_eq!(visible_char_count("<p>hello</p>"), 5);
        assert_eq!(visible_char_count("  <div> a b </div>  "), 3);
        assert_eq!(visible_char_count("<br/>"), 0);
    }

    #[test]
    fn test_framework_without_login_intent_is_not_enough() {
        let html = r#"<html><body><div id="root"></div><script src="/bundle.js"></script></body></html>"#;
        let signals = evaluate(html, "https://example.com/dashboard", &config());
        assert!(signals.framework_signs);
        assert!(!signals.login_intent);
        assert!(!signals.should_render());
    }

    #[test]
    fn test_framework_with_login_url_renders() {
        let html = r#"<html><body><div id="root"></div></body></html>"#;
        assert!(should_render(html, "https://example.com/login", &config()));
    }

    #[test]
    fn test_thin_content_with_login_keyword_renders() {
        let html = "<html><body><h1>Log in</h1></body></html>";
        let signals = evaluate(html, "https://example.com/", &config());
        assert!(!signals.framework_signs);
        assert!(signals.minimal_content);
        assert!(signals.login_intent);
        assert!(signals.should_render());
    }

    #[test]
    fn test_rich_content_without_framework_does_not_render() {
        let body = "word ".repeat(3000);
        let html = format!("<html><body><p>{}</p><a href=\"/login\">x</a></body></html>", body);
        let signals = evaluate(&html, "https://example.com/", &config());
        assert!(!signals.minimal_content);
        assert!(signals.login_intent);
        assert!(!signals.should_render());
    }

    #[test]
    fn test_keywords_match_case_insensitively() {
        let html = "<html><body><div id=\"ROOT\"></div>SIGN IN</body></html>";
        let signals = evaluate(html, "https://EXAMPLE.com", &config());
        assert!(signals.framework_signs);
        assert!(signals.login_intent);
    }

    #[test]
    fn test_threshold_is_overridable() {
        let mut config = config();
        config.minimal_content_threshold = 3;
        let signals = evaluate("<p>login here</p>", "https://example.com", &config);
        assert!(!signals.minimal_content);
    }
}
