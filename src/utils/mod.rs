//! Shared utility functions.
//!
//! This module contains reusable utilities used across the codebase:
//! - `html`: escaping for serialized snippets and page-title extraction
//! - `url`: URL normalization and validation for inbound requests

mod html;
mod url;

pub use html::{escape_attr, escape_text, extract_title};
pub use url::{normalize_url, urls_differ, validate_url, UrlError};
