//! Classifier fallback for pages where structural detection found nothing.
//!
//! Every failure here is soft: an unavailable classifier, a transport error
//! or an unparseable answer all mean "no fallback result".

use std::sync::Arc;

use scraper::{ElementRef, Html};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::client::prompts::login_classification_prompt;
use super::client::{Classifier, LlmError};
use crate::detection::{clean_snippet, truncate};
use crate::models::{AuthComponents, OAuthAuthComponent, TraditionalAuthComponent};

/// Class/id fragments of sections worth sending to the classifier.
const SECTION_KEYWORDS: &[&str] = &["login", "signin", "sign-in", "auth", "authentication"];
const SECTIONS_PER_KEYWORD: usize = 2;
const MAX_SECTION_CHARS: usize = 2000;
const MAX_BODY_CHARS: usize = 3000;
/// Hard cap on the whole excerpt.
pub const MAX_EXCERPT_CHARS: usize = 8000;

/// Structured answer requested from the classifier.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LlmVerdict {
    #[serde(default)]
    pub has_login_form: bool,
    #[serde(default)]
    pub has_password_field: bool,
    #[serde(default)]
    pub has_email_username_field: bool,
    #[serde(default)]
    pub oauth_providers: Vec<String>,
    #[serde(default)]
    pub confidence: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
}

impl LlmVerdict {
    /// Confidence label, "medium" when the classifier gave none.
    pub fn confidence(&self) -> String {
        self.confidence
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or("medium")
            .to_lowercase()
    }

    /// Normalize into the same component schema the structural passes use.
    pub fn into_components(self) -> AuthComponents {
        let mut indicators = Vec::new();
        if self.has_password_field {
            indicators.push("password_field_detected_by_llm".to_string());
        }
        if self.has_email_username_field {
            indicators.push("email_username_field_detected_by_llm".to_string());
        }
        let reasoning = self
            .reasoning
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or("Login form detected");
        let traditional = if self.has_login_form {
            TraditionalAuthComponent {
                found: true,
                html_snippets: vec![format!("LLM Analysis: {}", reasoning)],
                indicators,
            }
        } else {
            TraditionalAuthComponent::not_found()
        };

        let mut providers: Vec<String> = Vec::new();
        for provider in &self.oauth_providers {
            let provider = provider.trim().to_lowercase();
            if !provider.is_empty() && !providers.contains(&provider) {
                providers.push(provider);
            }
        }
        let oauth = if providers.is_empty() {
            OAuthAuthComponent::not_found()
        } else {
            let snippet = format!("LLM detected OAuth providers: {}", providers.join(", "));
            let indicators = providers
                .iter()
                .map(|p| format!("{}_detected_by_llm", p))
                .collect();
            OAuthAuthComponent::from_matches(providers, vec![snippet], indicators)
        };

        AuthComponents::new(traditional, oauth)
    }
}

/// Components produced by the classifier, with its confidence label.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmOutcome {
    pub components: AuthComponents,
    pub confidence: String,
}

/// Runs the classifier when one is configured.
#[derive(Clone, Default)]
pub struct LlmFallback {
    classifier: Option<Arc<dyn Classifier>>,
}

impl LlmFallback {
    pub fn new(classifier: Option<Arc<dyn Classifier>>) -> Self {
        Self { classifier }
    }

    /// A fallback that never runs.
    pub fn disabled() -> Self {
        Self { classifier: None }
    }

    pub fn is_available(&self) -> bool {
        self.classifier.is_some()
    }

    /// Classify `html`. Returns a result only when the classifier reports a
    /// login form.
    pub async fn classify(&self, html: &str, url: &str) -> Option<LlmOutcome> {
        let Some(classifier) = self.classifier.as_ref() else {
            debug!("LLM detection not available");
            return None;
        };

        info!("Attempting LLM-based detection for {}", url);
        let prompt = login_classification_prompt(url, &extract_relevant_html(html));

        let response = match classifier.complete(&prompt).await {
            Ok(text) => text,
            Err(LlmError::Disabled) => {
                debug!("LLM detection disabled");
                return None;
            }
            Err(e) => {
                warn!("LLM detection failed for {}: {}", url, e);
                return None;
            }
        };

        let verdict = match parse_verdict(&response) {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!("Failed to parse LLM response for {}: {}", url, e);
                debug!("Response was: {}", response.chars().take(300).collect::<String>());
                return None;
            }
        };

        info!(
            "LLM detection result: has_login={}, confidence={}",
            verdict.has_login_form,
            verdict.confidence()
        );
        if !verdict.has_login_form {
            return None;
        }

        let confidence = verdict.confidence();
        Some(LlmOutcome {
            components: verdict.into_components(),
            confidence,
        })
    }
}

/// Strip a markdown code fence around a JSON payload, if present.
pub fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    if let Some((_, rest)) = trimmed.split_once("```json") {
        return rest.split("```").next().unwrap_or(rest).trim();
    }
    let parts: Vec<&str> = trimmed.split("```").collect();
    if parts.len() >= 3 {
        return parts[1].trim();
    }
    trimmed
}

/// Parse a classifier answer into a verdict.
pub fn parse_verdict(response: &str) -> Result<LlmVerdict, LlmError> {
    let payload = strip_code_fence(response);
    serde_json::from_str(payload).or_else(|first_err| {
        // Prose around the object: fall back to the outermost braces.
        match (payload.find('{'), payload.rfind('}')) {
            (Some(start), Some(end)) if start < end => serde_json::from_str(&payload[start..=end])
                .map_err(|e| LlmError::Parse(e.to_string())),
            _ => Err(LlmError::Parse(first_err.to_string())),
        }
    })
}

/// Build a bounded, login-focused excerpt of the page.
pub fn extract_relevant_html(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut parts: Vec<String> = Vec::new();

    if let Ok(sections) = scraper::Selector::parse("div, section, form") {
        for keyword in SECTION_KEYWORDS {
            let matching = document
                .select(&sections)
                .filter(|el| names_keyword(*el, keyword))
                .take(SECTIONS_PER_KEYWORD);
            parts.extend(matching.map(|el| clean_snippet(el, MAX_SECTION_CHARS)));
        }
    }

    if parts.is_empty() {
        if let Ok(body) = scraper::Selector::parse("body") {
            if let Some(body) = document.select(&body).next() {
                parts.push(clean_snippet(body, MAX_BODY_CHARS));
            }
        }
    }

    truncate(&parts.join("\n"), MAX_EXCERPT_CHARS)
}

fn names_keyword(el: ElementRef<'_>, keyword: &str) -> bool {
    let value = el.value();
    let in_class = value.attr("class").is_some_and(|c| c.to_lowercase().contains(keyword));
    let in_id = value.id().is_some_and(|id| id.to_lowercase().contains(keyword));
    in_class || in_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Scripted {
        answer: Result<String, LlmError>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(answer: Result<&str, LlmError>) -> Arc<Self> {
            Arc::new(Self {
                answer: answer.map(str::to_string),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Classifier for Scripted {
        async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer.clone()
        }
    }

    const POSITIVE: &str = r#"{"has_login_form": true, "has_password_field": true,
        "has_email_username_field": false, "oauth_providers": ["Google", "github", "google"],
        "confidence": "high", "reasoning": "Password field inside a modal"}"#;

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn test_parse_verdict_with_prose() {
        let verdict = parse_verdict("Here you go: {\"has_login_form\": true} hope it helps").unwrap();
        assert!(verdict.has_login_form);
        assert!(verdict.oauth_providers.is_empty());
        assert_eq!(verdict.confidence(), "medium");
    }

    #[test]
    fn test_parse_verdict_rejects_garbage() {
        assert!(matches!(parse_verdict("no json here"), Err(LlmError::Parse(_))));
    }

    #[test]
    fn test_normalization() {
        let components = parse_verdict(POSITIVE).unwrap().into_components();
        let form = &components.traditional_form;
        assert!(form.found);
        assert_eq!(form.html_snippets, vec!["LLM Analysis: Password field inside a modal"]);
        assert_eq!(form.indicators, vec!["password_field_detected_by_llm"]);

        let oauth = &components.oauth_buttons;
        assert_eq!(oauth.providers, vec!["google", "github"]);
        assert_eq!(
            oauth.indicators,
            vec!["google_detected_by_llm", "github_detected_by_llm"]
        );
        assert_eq!(oauth.html_snippets, vec!["LLM detected OAuth providers: google, github"]);
    }

    #[test]
    fn test_excerpt_prefers_login_sections() {
        let html = r#"<body><nav>menu</nav>
            <div id="login-box"><script>x()</script><input type="email"></div>
            <section class="Auth">two</section><div class="auth">three</div>
            <footer>footer</footer></body>"#;
        let excerpt = extract_relevant_html(html);
        assert!(excerpt.contains("login-box"));
        assert!(excerpt.contains("two"));
        assert!(!excerpt.contains("x()"));
        assert!(!excerpt.contains("footer"));
    }

    #[test]
    fn test_excerpt_falls_back_to_body_and_is_bounded() {
        let html = format!("<body><p>{}</p></body>", "word ".repeat(5000));
        let excerpt = extract_relevant_html(&html);
        assert!(excerpt.starts_with("<body>"));
        assert_eq!(excerpt.chars().count(), MAX_BODY_CHARS);

        let many: String = (0..20)
            .map(|i| format!("<div class=\"login auth signin\" id=\"s{}\"><p>{}</p></div>", i, "y".repeat(3000)))
            .collect();
        let excerpt = extract_relevant_html(&many);
        assert_eq!(excerpt.chars().count(), MAX_EXCERPT_CHARS);
        assert!(excerpt.ends_with("..."));
    }

    #[tokio::test]
    async fn test_no_classifier_means_no_result() {
        let fallback = LlmFallback::disabled();
        assert!(!fallback.is_available());
        assert_eq!(fallback.classify("<html></html>", "https://example.com").await, None);
    }

    #[tokio::test]
    async fn test_positive_answer_is_returned() {
        let classifier = Scripted::new(Ok(POSITIVE));
        let fallback = LlmFallback::new(Some(classifier.clone()));
        let outcome = fallback
            .classify("<html><body>app</body></html>", "https://example.com")
            .await
            .unwrap();
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);
        assert_eq!(outcome.confidence, "high");
        assert!(outcome.components.traditional_form.found);
    }

    #[tokio::test]
    async fn test_negative_answer_is_discarded() {
        let classifier = Scripted::new(Ok(
            "```json\n{\"has_login_form\": false, \"oauth_providers\": [\"google\"]}\n```",
        ));
        let fallback = LlmFallback::new(Some(classifier));
        assert_eq!(fallback.classify("<html></html>", "https://example.com").await, None);
    }

    #[tokio::test]
    async fn test_errors_are_soft() {
        for answer in [
            Err(LlmError::Connection("refused".into())),
            Err(LlmError::Disabled),
            Ok("I think there is a login form"),
        ] {
            let fallback = LlmFallback::new(Some(Scripted::new(answer)));
            assert_eq!(fallback.classify("<html></html>", "https://example.com").await, None);
        }
    }
}
