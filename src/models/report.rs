//! Response models returned to callers of `analyze`.

use serde::{Deserialize, Serialize};

use super::{AuthComponents, ScrapeMethod};
use crate::scrapers::ScrapeError;

/// Which engine produced the components in a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    /// DOM heuristics.
    Structural,
    /// Language-model classification.
    Llm,
}

/// Scraping metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub scrape_time_ms: u64,
    pub page_title: Option<String>,
    pub redirect_detected: bool,
}

/// Successful analysis of a single page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub success: bool,
    pub url: String,
    pub auth_found: bool,
    pub scraping_method: ScrapeMethod,
    pub components: AuthComponents,
    pub detection_method: DetectionMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_confidence: Option<String>,
    pub metadata: ReportMetadata,
}

/// Failed analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub success: bool,
    pub url: String,
    pub error: String,
    pub message: String,
    pub auth_found: bool,
}

impl ErrorReport {
    pub fn new(url: &str, error: &str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            url: url.to_string(),
            error: error.to_string(),
            message: message.into(),
            auth_found: false,
        }
    }

    pub fn invalid_url(url: &str) -> Self {
        Self::new(
            url,
            "invalid_url",
            "Please provide a valid URL (e.g., https://example.com)",
        )
    }

    pub fn timeout(url: &str) -> Self {
        Self::new(
            url,
            "timeout",
            "Request timed out. The website took too long to respond.",
        )
    }

    pub fn from_scrape_error(url: &str, err: &ScrapeError) -> Self {
        Self::new(url, err.kind(), err.user_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_report_from_blocked_fetch() {
        let err = ScrapeError::FetchHttp { status: 403 };
        let report = ErrorReport::from_scrape_error("https://example.com", &err);
        assert!(!report.success);
        assert!(!report.auth_found);
        assert_eq!(report.error, "blocked");
        assert!(report.message.contains("Access denied"));
    }

    #[test]
    fn test_report_skips_missing_confidence() {
        let report = AnalysisReport {
            success: true,
            url: "https://example.com".to_string(),
            auth_found: false,
            scraping_method: ScrapeMethod::Static,
            components: AuthComponents::empty(),
            detection_method: DetectionMethod::Structural,
            llm_confidence: None,
            metadata: ReportMetadata {
                scrape_time_ms: 12,
                page_title: Some("Example".to_string()),
                redirect_detected: false,
            },
        };
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("llm_confidence").is_none());
        assert_eq!(json["scraping_method"], "static");
        assert_eq!(json["detection_method"], "structural");
        assert_eq!(json["metadata"]["page_title"], "Example");
    }
}
