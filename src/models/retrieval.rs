//! Page retrieval result produced by the acquisition orchestrator.

use serde::{Deserialize, Serialize};

/// How the HTML in a [`RetrievalResult`] was obtained.
///
/// The two `StaticAfter*` variants carry a body captured by the static fetch
/// after the rendered fetch could not complete. Treat them as lower
/// confidence than [`ScrapeMethod::Dynamic`]: the page may have been
/// incomplete before scripts ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrapeMethod {
    Static,
    Dynamic,
    StaticAfterRenderTimeout,
    StaticAfterRenderFailure,
}

impl ScrapeMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Dynamic => "dynamic",
            Self::StaticAfterRenderTimeout => "static_after_render_timeout",
            Self::StaticAfterRenderFailure => "static_after_render_failure",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "static" => Some(Self::Static),
            "dynamic" => Some(Self::Dynamic),
            "static_after_render_timeout" => Some(Self::StaticAfterRenderTimeout),
            "static_after_render_failure" => Some(Self::StaticAfterRenderFailure),
            _ => None,
        }
    }

    /// Whether the HTML came from a fallback after the render path failed.
    pub fn is_fallback(&self) -> bool {
        matches!(
            self,
            Self::StaticAfterRenderTimeout | Self::StaticAfterRenderFailure
        )
    }
}

impl std::fmt::Display for ScrapeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized output of one acquisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalResult {
    pub html: String,
    pub method: ScrapeMethod,
    /// The final URL differed from the requested one.
    pub redirected: bool,
}

impl RetrievalResult {
    pub fn new(html: String, method: ScrapeMethod, redirected: bool) -> Self {
        Self {
            html,
            method,
            redirected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_str_round_trip() {
        for method in [
            ScrapeMethod::Static,
            ScrapeMethod::Dynamic,
            ScrapeMethod::StaticAfterRenderTimeout,
            ScrapeMethod::StaticAfterRenderFailure,
        ] {
            assert_eq!(ScrapeMethod::from_str(method.as_str()), Some(method));
        }
        assert_eq!(ScrapeMethod::from_str("playwright"), None);
    }

    #[test]
    fn test_method_serializes_snake_case() {
        let json = serde_json::to_string(&ScrapeMethod::StaticAfterRenderTimeout).unwrap();
        assert_eq!(json, "\"static_after_render_timeout\"");
    }

    #[test]
    fn test_fallback_methods() {
        assert!(!ScrapeMethod::Static.is_fallback());
        assert!(!ScrapeMethod::Dynamic.is_fallback());
        assert!(ScrapeMethod::StaticAfterRenderTimeout.is_fallback());
        assert!(ScrapeMethod::StaticAfterRenderFailure.is_fallback());
    }
}
