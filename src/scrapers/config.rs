//! Acquisition configuration types.
//!
//! These structs are deserialized from the `fetch` and `spa` tables of the
//! settings file. Every field has a default so a partial table is valid.

use serde::{Deserialize, Serialize};

/// Static fetch options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,
    /// User agent for both the static fetch and the renderer. Unset means
    /// the desktop Chrome default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

fn default_fetch_timeout() -> u64 {
    10
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout(),
            user_agent: None,
        }
    }
}

/// Markers suggesting the page is assembled by client-side script.
pub const DEFAULT_FRAMEWORK_SIGNS: &[&str] = &[
    "<div id=\"root\"",
    "<div id=\"app\"",
    "react",
    "vue",
    "angular",
    "bundle.js",
    "app.js",
    "main.js",
    "__next_data__",
    "nuxt",
    "<noscript>",
    "enable javascript",
    "javascript is required",
    "window.__",
];

/// Keywords suggesting the page is about signing in.
pub const DEFAULT_LOGIN_KEYWORDS: &[&str] =
    &["login", "sign in", "signin", "log in", "authentication"];

/// Thresholds and keyword lists for the rendering decision.
///
/// The defaults were tuned against a small set of login pages and may
/// misclassify other sites; override them in the settings file rather
/// than in code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaHeuristicConfig {
    /// Tag-free character count below which a page counts as thin.
    #[serde(default = "default_minimal_content_threshold")]
    pub minimal_content_threshold: usize,
    /// Static bodies at or below this many characters are not trusted and
    /// never used as a fallback.
    #[serde(default = "default_min_static_body_chars")]
    pub min_static_body_chars: usize,
    /// Case-insensitive substrings that indicate a client-rendered app.
    #[serde(default = "default_framework_signs")]
    pub framework_signs: Vec<String>,
    /// Case-insensitive substrings that indicate login intent.
    #[serde(default = "default_login_keywords")]
    pub login_keywords: Vec<String>,
}

fn default_minimal_content_threshold() -> usize {
    10_000
}

fn default_min_static_body_chars() -> usize {
    500
}

fn default_framework_signs() -> Vec<String> {
    DEFAULT_FRAMEWORK_SIGNS.iter().map(|s| s.to_string()).collect()
}

fn default_login_keywords() -> Vec<String> {
    DEFAULT_LOGIN_KEYWORDS.iter().map(|s| s.to_string()).collect()
}

impl Default for SpaHeuristicConfig {
    fn default() -> Self {
        Self {
            minimal_content_threshold: default_minimal_content_threshold(),
            min_static_body_chars: default_min_static_body_chars(),
            framework_signs: default_framework_signs(),
            login_keywords: default_login_keywords(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_table_uses_defaults() {
        let config: SpaHeuristicConfig =
            toml::from_str("minimal_content_threshold = 2000").unwrap();
        assert_eq!(config.minimal_content_threshold, 2000);
        assert_eq!(config.min_static_body_chars, 500);
        assert!(config.framework_signs.iter().any(|s| s == "__next_data__"));
    }

    #[test]
    fn test_fetch_defaults() {
        let config: FetchConfig = toml::from_str("").unwrap();
        assert_eq!(config.timeout_secs, 10);
        assert!(config.user_agent.is_none());
    }
}
