//! Settings loading.
//!
//! A config file is discovered with `prefer` (`loginlens.toml`,
//! `loginlens.json`, ... in the usual locations) and parsed with serde by
//! extension. Environment variables are applied on top.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::llm::LlmConfig;
use crate::scrapers::{BrowserEngineConfig, FetchConfig, SpaHeuristicConfig};

/// Origins allowed in every environment.
const BASE_CORS_ORIGINS: &[&str] = &[
    "http://localhost:5173",
    "http://localhost:3000",
    "http://localhost:8080",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse {format} config: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },
}

/// HTTP surface settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Deployment environment: development, docker or production.
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Extra allowed CORS origins on top of the local dev ports.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Bound on one whole analysis request.
    #[serde(default = "default_analyze_timeout")]
    pub analyze_timeout_secs: u64,
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_analyze_timeout() -> u64 {
    45
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            cors_origins: Vec::new(),
            analyze_timeout_secs: default_analyze_timeout(),
        }
    }
}

impl ServerConfig {
    /// Every origin the server should accept.
    pub fn allowed_origins(&self) -> Vec<String> {
        let mut origins: Vec<String> = BASE_CORS_ORIGINS.iter().map(|s| s.to_string()).collect();
        if matches!(self.environment.as_str(), "development" | "docker") {
            origins.push("http://localhost".to_string());
        }
        for origin in &self.cors_origins {
            if !origin.is_empty() && !origins.contains(origin) {
                origins.push(origin.clone());
            }
        }
        origins
    }
}

/// Top-level settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub browser: BrowserEngineConfig,
    #[serde(default)]
    pub spa: SpaHeuristicConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub server: ServerConfig,
    /// Where these settings were read from.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Settings {
    /// Discover and load settings, falling back to defaults. Environment
    /// overrides are applied either way.
    pub async fn load() -> Self {
        // Use prefer for file discovery, then parse with serde
        let loaded = match prefer::load("loginlens").await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => match Self::load_from_path(path).await {
                    Ok(settings) => Some(settings),
                    Err(e) => {
                        warn!("Ignoring config file: {}", e);
                        None
                    }
                },
                None => None,
            },
            Err(_) => {
                debug!("No config file found, using defaults");
                None
            }
        };
        loaded.unwrap_or_default().with_env_overrides()
    }

    /// Load settings from a specific file. Supports TOML and JSON by
    /// extension; anything else is read as JSON.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let mut settings = Self::parse(&contents, path)?;
        settings.source_path = Some(path.to_path_buf());
        Ok(settings)
    }

    fn parse(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        match ext {
            "toml" => toml::from_str(contents).map_err(|e| ConfigError::Parse {
                format: "TOML",
                message: e.to_string(),
            }),
            _ => serde_json::from_str(contents).map_err(|e| ConfigError::Parse {
                format: "JSON",
                message: e.to_string(),
            }),
        }
    }

    /// Apply process environment overrides.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable source.
    ///
    /// Supported env vars (besides the `LLM_*` family):
    /// - `LOGINLENS_FETCH_TIMEOUT`: static fetch timeout in seconds
    /// - `LOGINLENS_RENDER_TIMEOUT`: whole-render timeout in seconds
    /// - `BROWSER_URL`: remote Chrome DevTools endpoint
    /// - `CORS_ORIGINS`: comma-separated extra origins
    /// - `ENVIRONMENT`: development, docker or production
    pub fn with_overrides<F>(mut self, var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(n) = var("LOGINLENS_FETCH_TIMEOUT").and_then(|v| v.parse().ok()) {
            self.fetch.timeout_secs = n;
        }
        if let Some(n) = var("LOGINLENS_RENDER_TIMEOUT").and_then(|v| v.parse().ok()) {
            self.browser.timeout_secs = n;
        }
        if let Some(url) = var("BROWSER_URL").filter(|u| !u.trim().is_empty()) {
            self.browser.remote_url = Some(url);
        }
        if let Some(env) = var("ENVIRONMENT") {
            self.server.environment = env.to_lowercase();
        }
        if let Some(origins) = var("CORS_ORIGINS") {
            self.server.cors_origins.extend(
                origins
                    .split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty()),
            );
        }
        self.llm = self.llm.with_overrides(&var);
        self
    }
}
