//! Render policy for a single page.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use chromiumoxide::error::CdpError;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
use chromiumoxide::Page;

use super::types::RenderedPage;
use super::BrowserFetcher;
use crate::scrapers::error::ScrapeError;
use crate::utils::urls_differ;

/// Resolves once the DOM has been parsed.
const WAIT_FOR_READY_SCRIPT: &str = r#"
    new Promise((resolve) => {
        if (document.readyState === 'complete' || document.readyState === 'interactive') {
            resolve(document.readyState);
        } else {
            document.addEventListener('DOMContentLoaded', () => resolve(document.readyState));
        }
    })
"#;

/// Password-typed, or password-named/IDed inputs whose type is toggled by script.
const PASSWORD_SELECTOR: &str =
    r#"input[type="password" i], input[name*="password" i], input[id*="password" i]"#;

const SCROLL_SCRIPT: &str = "window.scrollTo(0, document.body.scrollHeight)";

const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Upper bound on each browser teardown step.
pub(super) const TEARDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Why a render step stopped.
#[derive(Debug)]
enum RenderStepError {
    /// Navigation did not reach DOM content within this many seconds.
    NavigationTimeout(u64),
    Failed(anyhow::Error),
}

impl From<CdpError> for RenderStepError {
    fn from(e: CdpError) -> Self {
        Self::Failed(e.into())
    }
}

impl From<RenderStepError> for ScrapeError {
    fn from(e: RenderStepError) -> Self {
        match e {
            RenderStepError::NavigationTimeout(secs) => ScrapeError::RenderTimeout(secs),
            RenderStepError::Failed(e) => ScrapeError::RenderFailure(format!("{:#}", e)),
        }
    }
}

/// Await a teardown step for at most `limit`. Failures and overruns are
/// logged and swallowed; returns whether the step finished in time.
pub(super) async fn finish_within<F, T, E>(limit: Duration, step: &str, fut: F) -> bool
where
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(Ok(_)) => true,
        Ok(Err(e)) => {
            debug!("{} failed: {}", step, e);
            true
        }
        Err(_) => {
            debug!("{} did not finish within {:?}", step, limit);
            false
        }
    }
}

/// Poll for a password input until `wait` elapses. Absence is not an error.
async fn wait_for_password_input(page: &Page, wait: Duration) {
    let deadline = Instant::now() + wait;
    loop {
        if page.find_element(PASSWORD_SELECTOR).await.is_ok() {
            debug!("Password input present");
            return;
        }
        if Instant::now() + SELECTOR_POLL_INTERVAL > deadline {
            debug!("No password input within {:?}, continuing", wait);
            return;
        }
        tokio::time::sleep(SELECTOR_POLL_INTERVAL).await;
    }
}

impl BrowserFetcher {
    /// Render a URL under the configured overall timeout.
    pub(crate) async fn render_page(&self, url: &str) -> Result<RenderedPage, ScrapeError> {
        let total = self.config.timeout_secs;
        let deadline = Instant::now() + Duration::from_secs(total);
        info!("Starting rendered scrape for: {}", url);

        let session = match timeout_at(deadline, self.open_session()).await {
            Ok(Ok(session)) => session,
            Ok(Err(e)) => return Err(ScrapeError::RenderFailure(format!("{:#}", e))),
            Err(_) => {
                warn!("Browser startup exceeded {}s for {}", total, url);
                return Err(ScrapeError::RenderTimeout(total));
            }
        };

        let page = match timeout_at(deadline, session.browser.new_page("about:blank")).await {
            Ok(Ok(page)) => page,
            Ok(Err(e)) => {
                session.shutdown().await;
                return Err(ScrapeError::RenderFailure(format!(
                    "Failed to open page: {}",
                    e
                )));
            }
            Err(_) => {
                session.shutdown().await;
                return Err(ScrapeError::RenderTimeout(total));
            }
        };

        let outcome = timeout_at(deadline, self.render_inner(&page, url)).await;

        // Release everything before the outcome is surfaced.
        finish_within(TEARDOWN_TIMEOUT, "Page close", page.close()).await;
        session.shutdown().await;

        match outcome {
            Ok(Ok(rendered)) => {
                info!(
                    "Successfully rendered {} ({} chars)",
                    url,
                    rendered.html.chars().count()
                );
                Ok(rendered)
            }
            Ok(Err(e)) => {
                let err = ScrapeError::from(e);
                warn!("Render failed for {}: {}", url, err);
                Err(err)
            }
            Err(_) => {
                warn!("Render timed out after {}s for {}", total, url);
                Err(ScrapeError::RenderTimeout(total))
            }
        }
    }

    /// Render steps. Page cleanup is handled by the caller.
    async fn render_inner(&self, page: &Page, url: &str) -> Result<RenderedPage, RenderStepError> {
        let mut user_agent = SetUserAgentOverrideParams::new(self.user_agent.clone());
        user_agent.accept_language = Some(self.config.locale.clone());
        page.execute(user_agent).await?;

        page.execute(SetDeviceMetricsOverrideParams::new(
            i64::from(self.config.viewport_width),
            i64::from(self.config.viewport_height),
            1.0,
            false,
        ))
        .await?;

        self.navigate_to_url(page, url).await?;

        wait_for_password_input(page, Duration::from_secs(self.config.selector_wait_secs)).await;
        tokio::time::sleep(Duration::from_millis(self.config.settle_delay_ms)).await;

        match page.evaluate(SCROLL_SCRIPT.to_string()).await {
            Ok(_) => {
                tokio::time::sleep(Duration::from_millis(self.config.scroll_settle_ms)).await;
            }
            Err(e) => debug!("Scroll skipped: {}", e),
        }

        let final_url = page
            .url()
            .await?
            .map(|u| u.to_string())
            .unwrap_or_else(|| url.to_string());
        let html = page.content().await?;

        Ok(RenderedPage {
            redirected: urls_differ(url, &final_url),
            html,
            final_url,
        })
    }

    /// Navigate and wait for DOM content, bounded by the navigation timeout.
    async fn navigate_to_url(&self, page: &Page, url: &str) -> Result<(), RenderStepError> {
        debug!("Navigating to {}", url);
        let nav_params = NavigateParams::builder()
            .url(url)
            .build()
            .map_err(|e| RenderStepError::Failed(anyhow::anyhow!("Invalid URL: {}", e)))?;

        let secs = self.config.navigation_timeout_secs;
        let navigation = async {
            page.execute(nav_params).await?;
            page.evaluate(WAIT_FOR_READY_SCRIPT.to_string()).await?;
            Ok::<_, CdpError>(())
        };

        match tokio::time::timeout(Duration::from_secs(secs), navigation).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(RenderStepError::Failed(anyhow::anyhow!(
                "Navigation failed for {}: {}",
                url,
                e
            ))),
            Err(_) => {
                warn!("Navigation timed out after {}s for {}", secs, url);
                Err(RenderStepError::NavigationTimeout(secs))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_timeout_is_render_timeout() {
        let err = ScrapeError::from(RenderStepError::NavigationTimeout(10));
        assert_eq!(err, ScrapeError::RenderTimeout(10));
        assert_eq!(err.status_code(), 408);
    }

    #[test]
    fn test_step_failure_is_render_failure() {
        let err = ScrapeError::from(RenderStepError::Failed(anyhow::anyhow!("target crashed")));
        assert_eq!(err, ScrapeError::RenderFailure("target crashed".to_string()));
    }

    #[tokio::test]
    async fn test_teardown_step_is_bounded() {
        let stuck = std::future::pending::<Result<(), String>>();
        let started = std::time::Instant::now();
        let finished = finish_within(Duration::from_millis(50), "Browser close", stuck).await;
        assert!(!finished);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_teardown_step_error_is_swallowed() {
        let failing = async { Err::<(), _>("already closed") };
        assert!(finish_within(TEARDOWN_TIMEOUT, "Page close", failing).await);
    }
}
