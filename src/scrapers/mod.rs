//! Page acquisition: static fetch, rendering, and the policy between them.

pub mod browser;
pub mod config;
pub mod error;
mod http_client;
pub mod orchestrator;
pub mod spa;

pub use browser::{BrowserEngineConfig, BrowserFetcher, PageRenderer, RenderedPage};
pub use config::{FetchConfig, SpaHeuristicConfig};
pub use error::ScrapeError;
pub use http_client::{resolve_user_agent, FetchedPage, HttpClient, PageFetcher, USER_AGENT};
pub use orchestrator::{has_password_marker, AcquisitionOrchestrator};
