//! Language-model fallback classification.

pub mod client;
pub mod fallback;

pub use client::{Classifier, LlmClient, LlmConfig, LlmError, LlmProvider};
pub use fallback::{LlmFallback, LlmOutcome, LlmVerdict};
