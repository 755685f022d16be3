//! The `analyze` operation: acquire a page, detect its login surface, and
//! fall back to the classifier when the structural passes find nothing.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::info;

use crate::config::Settings;
use crate::detection::AuthDetector;
use crate::llm::{Classifier, LlmClient, LlmError, LlmFallback};
use crate::models::{AnalysisReport, DetectionMethod, ReportMetadata};
use crate::scrapers::{
    resolve_user_agent, AcquisitionOrchestrator, BrowserFetcher, HttpClient, PageFetcher,
    PageRenderer, ScrapeError,
};
use crate::utils::extract_title;

/// Failure while wiring an [`Analyzer`] from settings.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error("failed to build LLM client: {0}")]
    Llm(#[from] LlmError),
}

/// The renderer reports the same user agent as the static fetch.
fn renderer_from_settings(settings: &Settings) -> BrowserFetcher {
    BrowserFetcher::new(settings.browser.clone())
        .with_user_agent(resolve_user_agent(settings.fetch.user_agent.as_deref()))
}

/// Per-request options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalyzeOptions {
    /// Skip the static fetch and render directly.
    pub force_browser: bool,
}

/// Stateless request pipeline. Cheap to clone and safe to share across
/// concurrent requests.
#[derive(Clone)]
pub struct Analyzer {
    orchestrator: AcquisitionOrchestrator,
    detector: AuthDetector,
    fallback: LlmFallback,
}

impl Analyzer {
    pub fn new(orchestrator: AcquisitionOrchestrator, fallback: LlmFallback) -> Self {
        Self {
            orchestrator,
            detector: AuthDetector::new(),
            fallback,
        }
    }

    /// Wire the real fetcher, renderer and (if configured) classifier.
    pub fn from_settings(settings: &Settings) -> Result<Self, BuildError> {
        let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpClient::new(&settings.fetch)?);
        let renderer: Arc<dyn PageRenderer> = Arc::new(renderer_from_settings(settings));
        let orchestrator = AcquisitionOrchestrator::new(fetcher, renderer, settings.spa.clone());

        let classifier: Option<Arc<dyn Classifier>> = if settings.llm.is_configured() {
            info!(
                "LLM fallback enabled ({} / {})",
                settings.llm.provider.as_str(),
                settings.llm.model()
            );
            Some(Arc::new(LlmClient::new(settings.llm.clone())?))
        } else {
            info!("LLM fallback disabled");
            None
        };

        Ok(Self::new(orchestrator, LlmFallback::new(classifier)))
    }

    pub async fn analyze(&self, url: &str) -> Result<AnalysisReport, ScrapeError> {
        self.analyze_with(url, AnalyzeOptions::default()).await
    }

    pub async fn analyze_with(
        &self,
        url: &str,
        options: AnalyzeOptions,
    ) -> Result<AnalysisReport, ScrapeError> {
        let started = Instant::now();
        let retrieval = if options.force_browser {
            self.orchestrator.acquire_rendered(url).await?
        } else {
            self.orchestrator.acquire(url).await?
        };
        let scrape_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!("Scraping completed in {}ms ({})", scrape_time_ms, retrieval.method);

        let mut components = self.detector.detect(&retrieval.html, url);
        let mut detection_method = DetectionMethod::Structural;
        let mut llm_confidence = None;

        if !components.has_auth() {
            if let Some(outcome) = self.fallback.classify(&retrieval.html, url).await {
                components = outcome.components;
                detection_method = DetectionMethod::Llm;
                llm_confidence = Some(outcome.confidence);
            }
        }

        let report = AnalysisReport {
            success: true,
            url: url.to_string(),
            auth_found: components.has_auth(),
            scraping_method: retrieval.method,
            components,
            detection_method,
            llm_confidence,
            metadata: ReportMetadata {
                scrape_time_ms,
                page_title: extract_title(&retrieval.html),
                redirect_detected: retrieval.redirected,
            },
        };
        info!(
            "Success - Auth found: {}, Method: {}, Time: {}ms",
            report.auth_found, report.scraping_method, scrape_time_ms
        );
        Ok(report)
    }
}

/// Analyze one URL with settings from the environment.
pub async fn analyze(url: &str) -> Result<AnalysisReport, ScrapeError> {
    let settings = Settings::default().with_env_overrides();
    let analyzer = Analyzer::from_settings(&settings).map_err(|e| ScrapeError::ScrapingFailure {
        cause: e.to_string(),
    })?;
    analyzer.analyze(url).await
}
