//! loginlens - detect login forms and OAuth/SSO buttons on web pages.
//!
//! A page is fetched statically, rendered in a headless browser when the
//! static HTML looks like a client-side app, and then scanned for a
//! username/password form and third-party sign-in controls. When the
//! structural scan finds nothing, an optional language-model classifier
//! gets a look at a trimmed excerpt.
//!
//! ```no_run
//! # async fn run() -> Result<(), loginlens::ScrapeError> {
//! let report = loginlens::analyze("https://github.com/login").await?;
//! println!("auth found: {}", report.auth_found);
//! # Ok(())
//! # }
//! ```

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod detection;
pub mod llm;
pub mod models;
pub mod scrapers;
pub mod server;
pub mod utils;

pub use analyzer::{analyze, AnalyzeOptions, Analyzer, BuildError};
pub use config::{ConfigError, ServerConfig, Settings};
pub use detection::{detect_auth, AuthDetector};
pub use llm::{Classifier, LlmClient, LlmConfig, LlmError, LlmFallback, LlmProvider};
pub use models::{
    AnalysisReport, AuthComponents, DetectionMethod, ErrorReport, OAuthAuthComponent,
    ReportMetadata, RetrievalResult, ScrapeMethod, TraditionalAuthComponent,
};
pub use scrapers::{
    AcquisitionOrchestrator, BrowserEngineConfig, BrowserFetcher, FetchConfig, FetchedPage,
    HttpClient, PageFetcher, PageRenderer, RenderedPage, ScrapeError, SpaHeuristicConfig,
};
