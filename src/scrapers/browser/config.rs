//! Rendering engine configuration.

use serde::{Deserialize, Serialize};

/// Browser engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserEngineConfig {
    /// Run in headless mode (default: true).
    /// Set to false for debugging.
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Hard bound on a whole render, including browser launch and teardown
    /// of the page.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Bound on navigation until DOM content is loaded.
    #[serde(default = "default_navigation_timeout")]
    pub navigation_timeout_secs: u64,

    /// How long to wait for a password input to appear.
    #[serde(default = "default_selector_wait")]
    pub selector_wait_secs: u64,

    /// Delay after the selector probe for late script execution.
    #[serde(default = "default_settle_delay")]
    pub settle_delay_ms: u64,

    /// Delay after scrolling to the bottom.
    #[serde(default = "default_scroll_settle")]
    pub scroll_settle_ms: u64,

    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,

    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,

    #[serde(default = "default_locale")]
    pub locale: String,

    /// Additional Chrome arguments.
    #[serde(default)]
    pub chrome_args: Vec<String>,

    /// Remote Chrome DevTools URL (e.g., "ws://localhost:9222").
    /// If set, connects to an existing browser instead of launching one.
    #[serde(default)]
    pub remote_url: Option<String>,

    /// Proxy server URL (e.g., "socks5://127.0.0.1:1080").
    #[serde(default)]
    pub proxy: Option<String>,
}

pub fn default_headless() -> bool {
    true
}

pub fn default_timeout() -> u64 {
    20
}

fn default_navigation_timeout() -> u64 {
    10
}

fn default_selector_wait() -> u64 {
    8
}

fn default_settle_delay() -> u64 {
    2000
}

fn default_scroll_settle() -> u64 {
    1000
}

fn default_viewport_width() -> u32 {
    1920
}

fn default_viewport_height() -> u32 {
    1080
}

fn default_locale() -> String {
    "en-US".to_string()
}

impl Default for BrowserEngineConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            timeout_secs: default_timeout(),
            navigation_timeout_secs: default_navigation_timeout(),
            selector_wait_secs: default_selector_wait(),
            settle_delay_ms: default_settle_delay(),
            scroll_settle_ms: default_scroll_settle(),
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            locale: default_locale(),
            chrome_args: Vec::new(),
            remote_url: None,
            proxy: None,
        }
    }
}
