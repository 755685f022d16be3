//! Acquisition orchestrator.
//!
//! Static fetch first; a rendered fetch only when the static result is
//! missing, too short, or looks like a client-rendered login page. When the
//! render cannot complete, a usable static body is returned under a
//! fallback method tag instead of failing.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{debug, info, warn};

use super::browser::PageRenderer;
use super::config::SpaHeuristicConfig;
use super::error::ScrapeError;
use super::http_client::{FetchedPage, PageFetcher};
use super::spa;
use crate::models::{RetrievalResult, ScrapeMethod};

/// `type=password` with double, single or no quotes.
static PASSWORD_TYPE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"(?i)\btype\s*=\s*(?:"password"|'password'|password(?:[\s/>]|$))"#).ok()
});

/// Whether the HTML already carries a password-typed input.
pub fn has_password_marker(html: &str) -> bool {
    match PASSWORD_TYPE.as_ref() {
        Some(re) => re.is_match(html),
        None => {
            let lower = html.to_lowercase();
            lower.contains("type=\"password\"") || lower.contains("type='password'")
        }
    }
}

/// Sequences static fetch, rendering decision, render and fallback.
#[derive(Clone)]
pub struct AcquisitionOrchestrator {
    fetcher: Arc<dyn PageFetcher>,
    renderer: Arc<dyn PageRenderer>,
    spa: SpaHeuristicConfig,
}

impl AcquisitionOrchestrator {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        renderer: Arc<dyn PageRenderer>,
        spa: SpaHeuristicConfig,
    ) -> Self {
        Self {
            fetcher,
            renderer,
            spa,
        }
    }

    /// Retrieve a page, rendering only when needed.
    pub async fn acquire(&self, url: &str) -> Result<RetrievalResult, ScrapeError> {
        let fallback = match self.fetcher.fetch(url).await {
            Ok(page) => match self.assess_static(url, page) {
                StaticVerdict::Accept(result) => return Ok(result),
                StaticVerdict::Render { reason, fallback } => {
                    info!("Attempting render for {}: {}", url, reason);
                    fallback
                }
            },
            Err(e) if e.allows_render_attempt() => {
                info!("Attempting render for {}: static fetch failed ({})", url, e);
                StaticFallback::Failed(e)
            }
            Err(e) => {
                warn!("Static fetch failed for {} without render attempt: {}", url, e);
                return Err(e);
            }
        };

        self.render_with_fallback(url, fallback).await
    }

    /// Skip the static attempt and render directly. No static body is
    /// available if the render fails.
    pub async fn acquire_rendered(&self, url: &str) -> Result<RetrievalResult, ScrapeError> {
        info!("Rendering {} without static attempt", url);
        self.render_with_fallback(url, StaticFallback::Skipped).await
    }

    fn assess_static(&self, url: &str, page: FetchedPage) -> StaticVerdict {
        let chars = page.body.chars().count();
        if chars <= self.spa.min_static_body_chars {
            return StaticVerdict::Render {
                reason: format!("static body too short ({} chars)", chars),
                fallback: StaticFallback::TooShort(chars),
            };
        }

        if has_password_marker(&page.body) {
            debug!("Password input present in static HTML for {}", url);
            return StaticVerdict::Accept(RetrievalResult::new(
                page.body,
                ScrapeMethod::Static,
                page.redirected,
            ));
        }

        if spa::should_render(&page.body, url, &self.spa) {
            return StaticVerdict::Render {
                reason: "page looks like a client-rendered login".to_string(),
                fallback: StaticFallback::Usable(page),
            };
        }

        StaticVerdict::Accept(RetrievalResult::new(
            page.body,
            ScrapeMethod::Static,
            page.redirected,
        ))
    }

    async fn render_with_fallback(
        &self,
        url: &str,
        fallback: StaticFallback,
    ) -> Result<RetrievalResult, ScrapeError> {
        let err = match self.renderer.render(url).await {
            Ok(rendered) => {
                return Ok(RetrievalResult::new(
                    rendered.html,
                    ScrapeMethod::Dynamic,
                    rendered.redirected,
                ))
            }
            Err(e) => e,
        };

        let timed_out = matches!(err, ScrapeError::RenderTimeout(_));
        match fallback {
            StaticFallback::Usable(page) => {
                let method = if timed_out {
                    ScrapeMethod::StaticAfterRenderTimeout
                } else {
                    ScrapeMethod::StaticAfterRenderFailure
                };
                warn!("Render failed for {} ({}), using static body as {}", url, err, method);
                Ok(RetrievalResult::new(page.body, method, page.redirected))
            }
            _ if timed_out => {
                warn!("Render timed out for {} with no usable static body", url);
                Err(err)
            }
            other => {
                let cause = match other.describe() {
                    Some(static_cause) => format!("static fetch: {}; render: {}", static_cause, err),
                    None => format!("render: {}", err),
                };
                warn!("Scraping failed for {}: {}", url, cause);
                Err(ScrapeError::ScrapingFailure { cause })
            }
        }
    }
}

enum StaticVerdict {
    Accept(RetrievalResult),
    Render {
        reason: String,
        fallback: StaticFallback,
    },
}

/// What the static attempt left behind for the render path.
enum StaticFallback {
    Usable(FetchedPage),
    TooShort(usize),
    Failed(ScrapeError),
    Skipped,
}

impl StaticFallback {
    fn describe(&self) -> Option<String> {
        match self {
            Self::Usable(_) => None,
            Self::TooShort(chars) => Some(format!("body too short ({} chars)", chars)),
            Self::Failed(e) => Some(e.to_string()),
            Self::Skipped => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::browser::RenderedPage;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeFetcher(Result<FetchedPage, ScrapeError>);

    #[async_trait]
    impl PageFetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchedPage, ScrapeError> {
            self.0.clone().map(|mut page| {
                page.final_url = url.to_string();
                page
            })
        }
    }

    struct FakeRenderer {
        result: Result<RenderedPage, ScrapeError>,
        calls: AtomicUsize,
    }

    impl FakeRenderer {
        fn new(result: Result<RenderedPage, ScrapeError>) -> Arc<Self> {
            Arc::new(Self {
                result,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PageRenderer for FakeRenderer {
        async fn render(&self, _url: &str) -> Result<RenderedPage, ScrapeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    const URL: &str = "https://example.com/login";

    fn page(body: String) -> Result<FetchedPage, ScrapeError> {
        Ok(FetchedPage {
            body,
            final_url: URL.to_string(),
            redirected: false,
        })
    }

    fn rendered() -> Result<RenderedPage, ScrapeError> {
        Ok(RenderedPage {
            html: "<html><input type=\"password\"></html>".to_string(),
            final_url: URL.to_string(),
            redirected: false,
        })
    }

    /// SPA shell padded to exactly `chars` characters.
    fn spa_body(chars: usize) -> String {
        let shell = "<html><body><div id=\"root\"></div><p>Sign in</p></body></html>";
        format!("{}{}", shell, " ".repeat(chars - shell.len()))
    }

    fn orchestrator(
        fetch: Result<FetchedPage, ScrapeError>,
        renderer: Arc<FakeRenderer>,
    ) -> AcquisitionOrchestrator {
        AcquisitionOrchestrator::new(
            Arc::new(FakeFetcher(fetch)),
            renderer,
            SpaHeuristicConfig::default(),
        )
    }

    #[test]
    fn test_password_marker() {
        assert!(has_password_marker("<input TYPE=\"Password\">"));
        assert!(has_password_marker("<input type='password'>"));
        assert!(!has_password_marker("<input type=\"text\" name=\"password\">"));
    }

    #[test]
    fn test_unquoted_password_marker() {
        assert!(has_password_marker("<input type=password name=pw>"));
        assert!(has_password_marker("<input name=pw type = PASSWORD>"));
        assert!(has_password_marker("<input type=password/>"));
        assert!(!has_password_marker("<input type=passwordless>"));
        assert!(!has_password_marker("<input type=text name=password>"));
    }

    #[tokio::test]
    async fn test_short_body_always_renders() {
        let renderer = FakeRenderer::new(rendered());
        let body = "x".repeat(300);
        let result = orchestrator(page(body), renderer.clone())
            .acquire(URL)
            .await
            .unwrap();
        assert_eq!(renderer.calls(), 1);
        assert_eq!(result.method, ScrapeMethod::Dynamic);
    }

    #[tokio::test]
    async fn test_short_body_is_not_a_fallback() {
        let renderer = FakeRenderer::new(Err(ScrapeError::RenderTimeout(20)));
        let err = orchestrator(page("x".repeat(300)), renderer)
            .acquire(URL)
            .await
            .unwrap_err();
        assert_eq!(err, ScrapeError::RenderTimeout(20));
    }

    #[tokio::test]
    async fn test_password_marker_skips_render() {
        let renderer = FakeRenderer::new(rendered());
        let body = format!("{}<input type=\"password\">", spa_body(900));
        let result = orchestrator(page(body.clone()), renderer.clone())
            .acquire(URL)
            .await
            .unwrap();
        assert_eq!(renderer.calls(), 0);
        assert_eq!(result.method, ScrapeMethod::Static);
        assert_eq!(result.html, body);
    }

    #[tokio::test]
    async fn test_unquoted_password_marker_skips_render() {
        let renderer = FakeRenderer::new(rendered());
        let body = format!("{}<input type=password name=pw>", spa_body(900));
        let result = orchestrator(page(body), renderer.clone())
            .acquire(URL)
            .await
            .unwrap();
        assert_eq!(renderer.calls(), 0);
        assert_eq!(result.method, ScrapeMethod::Static);
    }

    #[tokio::test]
    async fn test_render_timeout_falls_back_to_static() {
        let renderer = FakeRenderer::new(Err(ScrapeError::RenderTimeout(20)));
        let body = spa_body(900);
        let result = orchestrator(page(body.clone()), renderer.clone())
            .acquire(URL)
            .await
            .unwrap();
        assert_eq!(renderer.calls(), 1);
        assert_eq!(result.method, ScrapeMethod::StaticAfterRenderTimeout);
        assert_eq!(result.html, body);
    }

    #[tokio::test]
    async fn test_render_failure_falls_back_to_static() {
        let renderer = FakeRenderer::new(Err(ScrapeError::RenderFailure("crashed".into())));
        let result = orchestrator(page(spa_body(900)), renderer)
            .acquire(URL)
            .await
            .unwrap();
        assert_eq!(result.method, ScrapeMethod::StaticAfterRenderFailure);
    }

    #[tokio::test]
    async fn test_non_spa_page_returns_static() {
        let renderer = FakeRenderer::new(rendered());
        let body = format!("<html><body>{}</body></html>", "plain text ".repeat(1200));
        let result = orchestrator(page(body), renderer.clone())
            .acquire("https://example.com/about")
            .await
            .unwrap();
        assert_eq!(renderer.calls(), 0);
        assert_eq!(result.method, ScrapeMethod::Static);
    }

    #[tokio::test]
    async fn test_blocked_fetch_renders() {
        let renderer = FakeRenderer::new(rendered());
        let result = orchestrator(Err(ScrapeError::FetchHttp { status: 403 }), renderer.clone())
            .acquire(URL)
            .await
            .unwrap();
        assert_eq!(renderer.calls(), 1);
        assert_eq!(result.method, ScrapeMethod::Dynamic);
    }

    #[tokio::test]
    async fn test_not_found_fails_without_render() {
        let renderer = FakeRenderer::new(rendered());
        let err = orchestrator(Err(ScrapeError::FetchHttp { status: 404 }), renderer.clone())
            .acquire(URL)
            .await
            .unwrap_err();
        assert_eq!(renderer.calls(), 0);
        assert_eq!(err, ScrapeError::FetchHttp { status: 404 });
    }

    #[tokio::test]
    async fn test_both_paths_exhausted_reports_cause_chain() {
        let renderer = FakeRenderer::new(Err(ScrapeError::RenderFailure("crashed".into())));
        let err = orchestrator(Err(ScrapeError::FetchHttp { status: 503 }), renderer)
            .acquire(URL)
            .await
            .unwrap_err();
        match err {
            ScrapeError::ScrapingFailure { cause } => {
                assert!(cause.contains("HTTP error 503"));
                assert!(cause.contains("crashed"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_forced_render_has_no_fallback() {
        let renderer = FakeRenderer::new(Err(ScrapeError::RenderFailure("crashed".into())));
        let err = orchestrator(page(spa_body(900)), renderer.clone())
            .acquire_rendered(URL)
            .await
            .unwrap_err();
        assert_eq!(renderer.calls(), 1);
        assert!(matches!(err, ScrapeError::ScrapingFailure { .. }));
    }
}
