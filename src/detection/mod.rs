//! Authentication component detection.
//!
//! Two independent passes run over the parsed document: one for
//! username/password forms and one for third-party sign-in controls. A
//! pass that fails internally yields an empty component rather than
//! aborting the whole detection.

mod dom;
mod oauth;
pub mod providers;
mod snippet;
mod traditional;

pub use snippet::clean_snippet;
pub(crate) use snippet::truncate;

use scraper::Html;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::{AuthComponents, OAuthAuthComponent, TraditionalAuthComponent};

/// Internal failure inside a detection pass.
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("invalid selector {0}")]
    Selector(String),
}

/// Heuristic login-surface detector.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthDetector;

impl AuthDetector {
    pub fn new() -> Self {
        Self
    }

    /// Run both passes over `html`. `url` is used for logging only.
    pub fn detect(&self, html: &str, url: &str) -> AuthComponents {
        info!("Starting authentication detection for {}", url);
        let document = Html::parse_document(html);

        let traditional = traditional::detect(&document).unwrap_or_else(|e| {
            warn!("Traditional form detection failed for {}: {}", url, e);
            TraditionalAuthComponent::not_found()
        });
        let oauth = oauth::detect(&document).unwrap_or_else(|e| {
            warn!("OAuth detection failed for {}: {}", url, e);
            OAuthAuthComponent::not_found()
        });

        info!(
            "Detection complete - Traditional: {}, OAuth: {} ({} providers)",
            traditional.found,
            oauth.found,
            oauth.providers.len()
        );
        AuthComponents::new(traditional, oauth)
    }
}

/// Detect with a default [`AuthDetector`].
pub fn detect_auth(html: &str, url: &str) -> AuthComponents {
    AuthDetector::new().detect(html, url)
}
