//! HTTP API for login-surface analysis.
//!
//! Exposes the analyzer over JSON:
//! - `GET /` service info
//! - `GET /api/health` liveness probe
//! - `POST /api/scrape` analyze one URL

mod handlers;
mod routes;

pub use handlers::{ScrapeRequest, API_VERSION};
pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::analyzer::Analyzer;
use crate::config::{ServerConfig, Settings};

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        Ok(Self {
            analyzer: Arc::new(Analyzer::from_settings(settings)?),
            config: settings.server.clone(),
        })
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings)?;
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
