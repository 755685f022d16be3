//! Static page fetcher.
//!
//! Issues a single GET with a realistic browser header set and returns the
//! body if it is HTML. There are no retries here: the orchestrator decides
//! what happens after a failure.

mod user_agent;

pub use user_agent::{resolve_user_agent, USER_AGENT};

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::{redirect, Client};
use tracing::{debug, info, warn};

use super::config::FetchConfig;
use super::error::ScrapeError;
use crate::utils::urls_differ;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const ACCEPT_LANGUAGE_EN: &str = "en-US,en;q=0.9";
const MAX_REDIRECTS: usize = 10;

/// Body of a successful static fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub body: String,
    /// URL after redirects.
    pub final_url: String,
    pub redirected: bool,
}

/// A single-request page retrieval capability.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, ScrapeError>;
}

/// reqwest-backed static fetcher.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    /// Build a client from fetch configuration.
    pub fn new(config: &FetchConfig) -> reqwest::Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let user_agent = resolve_user_agent(config.user_agent.as_deref());

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_EN));
        headers.insert(
            "Upgrade-Insecure-Requests",
            HeaderValue::from_static("1"),
        );

        let client = Client::builder()
            .user_agent(&user_agent)
            .default_headers(headers)
            .timeout(timeout)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client, timeout })
    }

    /// Fetch a URL and return its HTML body.
    pub async fn get_html(&self, url: &str) -> Result<FetchedPage, ScrapeError> {
        info!("Starting static scrape for: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!("HTTP error scraping {}: {}", url, status.as_u16());
            return Err(ScrapeError::FetchHttp {
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_lowercase();
        if !is_html_content_type(&content_type) {
            warn!("Non-HTML response from {} ({})", url, content_type);
            return Err(ScrapeError::NotHtml { content_type });
        }

        let final_url = response.url().to_string();
        let redirected = urls_differ(url, &final_url);
        if redirected {
            debug!("{} redirected to {}", url, final_url);
        }

        let body = response.text().await.map_err(|e| self.map_error(url, e))?;

        info!(
            "Successfully scraped {} (status: {}, {} chars)",
            url,
            status.as_u16(),
            body.chars().count()
        );

        Ok(FetchedPage {
            body,
            final_url,
            redirected,
        })
    }

    fn map_error(&self, url: &str, err: reqwest::Error) -> ScrapeError {
        if err.is_timeout() {
            warn!("Timeout scraping {}", url);
            ScrapeError::FetchTimeout(self.timeout.as_secs())
        } else {
            warn!("Connection error scraping {}: {}", url, err);
            ScrapeError::FetchConnection(err.to_string())
        }
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, ScrapeError> {
        self.get_html(url).await
    }
}

fn is_html_content_type(content_type: &str) -> bool {
    content_type.contains("text/html") || content_type.contains("application/xhtml+xml")
}
