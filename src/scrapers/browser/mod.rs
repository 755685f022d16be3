//! Rendering backend adapter.
//!
//! Uses chromiumoxide (CDP) to load a page in a fresh browser, give its
//! scripts a bounded amount of time to build the DOM, and return the
//! resulting HTML. Each render owns its own browser (or, with a remote
//! endpoint, its own page) and releases it before returning, including
//! when the render times out.

mod config;
#[cfg(feature = "browser")]
mod fetch;
mod types;

pub use config::BrowserEngineConfig;
pub use types::RenderedPage;

use async_trait::async_trait;

use super::error::ScrapeError;
use super::http_client::USER_AGENT;

/// A script-executing page retrieval capability.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &str) -> Result<RenderedPage, ScrapeError>;
}

#[cfg(feature = "browser")]
use std::time::Duration;

#[cfg(feature = "browser")]
use anyhow::{Context, Result};
#[cfg(feature = "browser")]
use chromiumoxide::{Browser, BrowserConfig};
#[cfg(feature = "browser")]
use futures::StreamExt;
#[cfg(feature = "browser")]
use tokio::task::JoinHandle;
#[cfg(feature = "browser")]
use tracing::{debug, info};

/// Browser-backed renderer.
#[derive(Debug, Clone)]
pub struct BrowserFetcher {
    pub(crate) config: BrowserEngineConfig,
    pub(crate) user_agent: String,
}

/// A browser plus the task driving its CDP connection.
#[cfg(feature = "browser")]
pub(crate) struct BrowserSession {
    pub(crate) browser: Browser,
    handler: JoinHandle<()>,
    /// Launched by us, so closing it is our job.
    owned: bool,
}

#[cfg(feature = "browser")]
impl BrowserSession {
    /// Tear down the session. Errors are logged, never returned.
    /// Each step is bounded so a hung browser cannot stall the caller.
    pub(crate) async fn shutdown(mut self) {
        if self.owned {
            let limit = fetch::TEARDOWN_TIMEOUT;
            fetch::finish_within(limit, "Browser close", self.browser.close()).await;
            fetch::finish_within(limit, "Browser wait", self.browser.wait()).await;
        }
        self.handler.abort();
    }
}

#[cfg(feature = "browser")]
fn spawn_handler(mut handler: chromiumoxide::Handler) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    })
}

impl BrowserFetcher {
    /// Common Chrome executable paths to check.
    #[cfg(feature = "browser")]
    const CHROME_PATHS: &'static [&'static str] = &[
        // Linux
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        // macOS
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        "/opt/google/chrome/google-chrome",
    ];

    pub fn new(config: BrowserEngineConfig) -> Self {
        Self {
            config,
            user_agent: USER_AGENT.to_string(),
        }
    }

    /// Override the user agent the rendered page reports.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn config(&self) -> &BrowserEngineConfig {
        &self.config
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Find a Chrome executable on this machine.
    #[cfg(feature = "browser")]
    fn find_chrome() -> Result<std::path::PathBuf> {
        for path in Self::CHROME_PATHS {
            let p = std::path::Path::new(path);
            if p.exists() {
                debug!("Found Chrome at: {}", path);
                return Ok(p.to_path_buf());
            }
        }

        for cmd in &[
            "google-chrome",
            "google-chrome-stable",
            "chromium",
            "chromium-browser",
        ] {
            if let Ok(path) = which::which(cmd) {
                debug!("Found Chrome in PATH: {}", path.display());
                return Ok(path);
            }
        }

        Err(anyhow::anyhow!(
            "Chrome/Chromium not found. Install it or set BROWSER_URL to a remote DevTools endpoint"
        ))
    }

    /// Launch a browser, or connect to the configured remote one.
    #[cfg(feature = "browser")]
    pub(crate) async fn open_session(&self) -> Result<BrowserSession> {
        if let Some(remote_url) = self.config.remote_url.as_deref() {
            return self.connect_remote(remote_url).await;
        }

        info!("Launching browser (headless={})", self.config.headless);
        let chrome_path = Self::find_chrome()?;

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .window_size(self.config.viewport_width, self.config.viewport_height)
            .request_timeout(Duration::from_secs(self.config.timeout_secs));

        // with_head means NOT headless
        if !self.config.headless {
            builder = builder.with_head();
        }

        if let Some(ref proxy) = self.config.proxy {
            builder = builder.arg(format!("--proxy-server={}", proxy));
        }

        builder = builder
            .arg(format!("--lang={}", self.config.locale))
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-infobars")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("--disable-sync")
            .arg("--disable-translate")
            .arg("--no-sandbox")
            .arg("--disable-gpu");

        for arg in &self.config.chrome_args {
            builder = builder.arg(arg);
        }

        let config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build browser config: {}", e))?;

        let (browser, handler) = Browser::launch(config)
            .await
            .context("Failed to launch browser")?;

        Ok(BrowserSession {
            browser,
            handler: spawn_handler(handler),
            owned: true,
        })
    }

    /// Connect to a remote Chrome instance.
    #[cfg(feature = "browser")]
    async fn connect_remote(&self, url: &str) -> Result<BrowserSession> {
        info!("Connecting to remote browser at {}", url);

        // Get WebSocket URL from the /json/version endpoint
        let http_url = url
            .replace("ws://", "http://")
            .replace("wss://", "https://");
        let version_url = format!("{}/json/version", http_url.trim_end_matches('/'));

        let resp: serde_json::Value = reqwest::Client::new()
            .get(&version_url)
            .send()
            .await
            .context("Failed to connect to remote browser")?
            .json()
            .await
            .context("Failed to parse browser version info")?;

        let ws_url = resp
            .get("webSocketDebuggerUrl")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow::anyhow!("No webSocketDebuggerUrl in response"))?;

        debug!("Connecting to WebSocket: {}", ws_url);

        let handler_config = chromiumoxide::handler::HandlerConfig {
            request_timeout: Duration::from_secs(self.config.timeout_secs),
            ..Default::default()
        };

        let (browser, handler) = Browser::connect_with_config(ws_url, handler_config)
            .await
            .context("Failed to connect to remote browser")?;

        Ok(BrowserSession {
            browser,
            handler: spawn_handler(handler),
            owned: false,
        })
    }
}

#[async_trait]
impl PageRenderer for BrowserFetcher {
    #[cfg(feature = "browser")]
    async fn render(&self, url: &str) -> Result<RenderedPage, ScrapeError> {
        self.render_page(url).await
    }

    #[cfg(not(feature = "browser"))]
    async fn render(&self, url: &str) -> Result<RenderedPage, ScrapeError> {
        tracing::warn!("Cannot render {}: browser support not compiled", url);
        Err(ScrapeError::RenderFailure(
            "browser support not compiled".to_string(),
        ))
    }
}
