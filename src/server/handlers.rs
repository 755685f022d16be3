//! HTTP request handlers.

use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::{info, warn};

use super::AppState;
use crate::analyzer::AnalyzeOptions;
use crate::models::ErrorReport;
use crate::utils::{normalize_url, validate_url};

/// Version reported by the service endpoints.
pub const API_VERSION: &str = "1.0.0";

/// Body of `POST /api/scrape`.
#[derive(Debug, Deserialize)]
pub struct ScrapeRequest {
    pub url: String,
    #[serde(default)]
    pub force_browser: bool,
}

/// Service info.
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Login Form Detector API",
        "version": API_VERSION,
        "docs": "/api/health",
    }))
}

/// Health check endpoint for container orchestration.
pub async fn health() -> impl IntoResponse {
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ");
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": timestamp.to_string(),
        "version": API_VERSION,
    }))
}

/// Analyze a URL for login surfaces.
pub async fn scrape(State(state): State<AppState>, Json(request): Json<ScrapeRequest>) -> Response {
    let url = normalize_url(&request.url);
    if let Err(e) = validate_url(&url) {
        warn!("Invalid URL {:?}: {}", request.url, e);
        return error_response(StatusCode::BAD_REQUEST, ErrorReport::invalid_url(&request.url));
    }

    info!("Scraping URL: {}", url);
    let options = AnalyzeOptions {
        force_browser: request.force_browser,
    };
    let budget = Duration::from_secs(state.config.analyze_timeout_secs);

    match tokio::time::timeout(budget, state.analyzer.analyze_with(&url, options)).await {
        Ok(Ok(report)) => Json(report).into_response(),
        Ok(Err(e)) => {
            warn!("Scraping {} failed: {}", url, e);
            let status =
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            error_response(status, ErrorReport::from_scrape_error(&url, &e))
        }
        Err(_) => {
            warn!("Timeout scraping {} after {}s", url, budget.as_secs());
            error_response(StatusCode::REQUEST_TIMEOUT, ErrorReport::timeout(&url))
        }
    }
}

fn error_response(status: StatusCode, report: ErrorReport) -> Response {
    (status, Json(report)).into_response()
}
