//! Data models for loginlens.

mod auth;
mod report;
mod retrieval;

pub use auth::{AuthComponents, OAuthAuthComponent, TraditionalAuthComponent};
pub use report::{AnalysisReport, DetectionMethod, ErrorReport, ReportMetadata};
pub use retrieval::{RetrievalResult, ScrapeMethod};
