//! Scraping error types.

use thiserror::Error;

/// Failures raised while acquiring a page.
///
/// The fetch/render variants are produced by the leaf fetchers and are
/// normally consumed by the orchestrator. Only `ScrapingFailure`,
/// `RenderTimeout`, and non-retryable `FetchHttp`/`NotHtml` reach callers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScrapeError {
    #[error("Request timed out after {0}s")]
    FetchTimeout(u64),
    #[error("Connection error: {0}")]
    FetchConnection(String),
    #[error("HTTP error {status}")]
    FetchHttp { status: u16 },
    #[error("Response is not HTML (Content-Type: {content_type})")]
    NotHtml { content_type: String },
    #[error("Browser render timed out after {0}s")]
    RenderTimeout(u64),
    #[error("Browser render failed: {0}")]
    RenderFailure(String),
    #[error("Failed to scrape website: {cause}")]
    ScrapingFailure { cause: String },
}

impl ScrapeError {
    /// Static-fetch statuses that justify a render attempt instead of failing.
    pub const RENDERABLE_STATUSES: [u16; 3] = [403, 429, 503];

    /// Whether the orchestrator should try the render path after this error.
    pub fn allows_render_attempt(&self) -> bool {
        match self {
            Self::FetchTimeout(_) | Self::FetchConnection(_) => true,
            Self::FetchHttp { status } => Self::RENDERABLE_STATUSES.contains(status),
            _ => false,
        }
    }

    /// Stable snake_case code for error responses.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FetchTimeout(_) | Self::RenderTimeout(_) => "timeout",
            Self::FetchConnection(_) => "connection_error",
            Self::FetchHttp { status: 403 } => "blocked",
            Self::FetchHttp { status: 429 } => "rate_limited",
            Self::FetchHttp { .. } => "http_error",
            Self::NotHtml { .. } => "not_html",
            Self::RenderFailure(_) | Self::ScrapingFailure { .. } => "scraping_error",
        }
    }

    /// HTTP status a server should answer with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::FetchTimeout(_) | Self::RenderTimeout(_) => 408,
            Self::FetchConnection(_) => 503,
            Self::FetchHttp { status } if (400..=599).contains(status) => *status,
            Self::FetchHttp { .. } => 502,
            Self::NotHtml { .. } => 415,
            Self::RenderFailure(_) | Self::ScrapingFailure { .. } => 500,
        }
    }

    /// Human-readable message for error responses.
    pub fn user_message(&self) -> String {
        match self {
            Self::FetchTimeout(_) | Self::RenderTimeout(_) => {
                "Request timed out. The website took too long to respond.".to_string()
            }
            Self::FetchConnection(_) => {
                "Could not connect to the website. Please check the URL.".to_string()
            }
            Self::FetchHttp { status: 403 } => {
                "Access denied. The website may be blocking automated requests.".to_string()
            }
            Self::FetchHttp { status: 429 } => {
                "Rate limited. The website is blocking too many requests.".to_string()
            }
            other => other.to_string(),
        }
    }
}
