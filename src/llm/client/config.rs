//! LLM client configuration.

use serde::{Deserialize, Serialize};

/// LLM provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Ollama API (local, default)
    #[default]
    Ollama,
    /// OpenAI chat completions API
    OpenAI,
    /// Groq (OpenAI-compatible)
    Groq,
    /// Together.ai (OpenAI-compatible)
    Together,
    /// Google Gemini generateContent API
    #[serde(alias = "google")]
    Gemini,
}

impl LlmProvider {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Some(Self::Ollama),
            "openai" => Some(Self::OpenAI),
            "groq" => Some(Self::Groq),
            "together" => Some(Self::Together),
            "gemini" | "google" => Some(Self::Gemini),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::OpenAI => "openai",
            Self::Groq => "groq",
            Self::Together => "together",
            Self::Gemini => "gemini",
        }
    }

    /// Whether requests need an API key.
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, Self::Ollama)
    }

    /// Whether the provider speaks the OpenAI chat completions protocol.
    pub fn is_openai_compatible(&self) -> bool {
        matches!(self, Self::OpenAI | Self::Groq | Self::Together)
    }

    /// Endpoint used when none is configured.
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::Ollama => "http://localhost:11434",
            Self::OpenAI => "https://api.openai.com",
            Self::Groq => "https://api.groq.com/openai",
            Self::Together => "https://api.together.xyz",
            Self::Gemini => "https://generativelanguage.googleapis.com",
        }
    }

    /// Model used when none is configured.
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Ollama => "llama3.1:8b",
            Self::OpenAI => "gpt-4o-mini",
            Self::Groq => "llama-3.1-8b-instant",
            Self::Together => "meta-llama/Meta-Llama-3.1-70B-Instruct-Turbo",
            Self::Gemini => "gemini-2.5-flash",
        }
    }

    /// Environment variable holding this provider's key, if it has one.
    fn key_var(&self) -> Option<&'static str> {
        match self {
            Self::Ollama | Self::Together => None,
            Self::OpenAI => Some("OPENAI_API_KEY"),
            Self::Groq => Some("GROQ_API_KEY"),
            Self::Gemini => Some("GEMINI_API_KEY"),
        }
    }
}

/// Configuration for the login classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Whether the classifier fallback may run.
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub provider: LlmProvider,
    /// API endpoint. Unset means the provider's default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// API key for hosted providers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Model name. Unset means the provider's default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Maximum tokens in response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Temperature for generation (0.0 - 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_max_tokens() -> u32 {
    500
}

fn default_temperature() -> f32 {
    0.3
}

fn default_timeout() -> u64 {
    30
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: LlmProvider::default(),
            endpoint: None,
            api_key: None,
            model: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout(),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl LlmConfig {
    /// Configured endpoint without a trailing slash, or the provider default.
    pub fn endpoint(&self) -> &str {
        non_blank(self.endpoint.as_deref())
            .unwrap_or_else(|| self.provider.default_endpoint())
            .trim_end_matches('/')
    }

    /// Configured model, or the provider default.
    pub fn model(&self) -> &str {
        non_blank(self.model.as_deref()).unwrap_or_else(|| self.provider.default_model())
    }

    /// Enabled and able to reach a provider. Hosted providers also need a key.
    pub fn is_configured(&self) -> bool {
        if !self.enabled {
            return false;
        }
        !self.provider.requires_api_key() || non_blank(self.api_key.as_deref()).is_some()
    }

    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `LLM_ENABLED`: "true" or "false"
    /// - `LLM_PROVIDER`: "ollama", "openai", "groq", "together" or "gemini"
    /// - `LLM_ENDPOINT`: API endpoint (defaults based on provider)
    /// - `LLM_API_KEY`: API key for hosted providers
    /// - `LLM_MODEL`: Model name
    /// - `LLM_MAX_TOKENS`: Maximum tokens in response
    /// - `LLM_TEMPERATURE`: Generation temperature (0.0-1.0)
    /// - `LLM_TIMEOUT`: Request timeout in seconds
    ///
    /// Priority: LLM_PROVIDER wins over auto-detection from API keys.
    /// Without it, GEMINI_API_KEY, GROQ_API_KEY and OPENAI_API_KEY are tried
    /// in that order. Setting a provider or a key enables the classifier
    /// unless LLM_ENABLED says otherwise.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn with_overrides<F>(mut self, var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut activated = false;

        if let Some(provider) = var("LLM_PROVIDER").and_then(|v| LlmProvider::from_str(&v)) {
            self.switch_provider(provider);
            activated = true;
        }

        if let Some(val) = var("LLM_API_KEY") {
            self.api_key = Some(val);
            activated = true;
        }

        if activated && self.api_key.is_none() {
            self.api_key = self.provider.key_var().and_then(&var);
        } else if !activated && self.api_key.is_none() {
            // No explicit provider - auto-detect from available keys
            for provider in [LlmProvider::Gemini, LlmProvider::Groq, LlmProvider::OpenAI] {
                let key = provider.key_var().and_then(&var);
                if key.is_some() {
                    self.switch_provider(provider);
                    self.api_key = key;
                    activated = true;
                    break;
                }
            }
        }

        if activated {
            self.enabled = true;
        }
        if let Some(val) = var("LLM_ENABLED") {
            self.enabled = val.eq_ignore_ascii_case("true") || val == "1";
        }
        if let Some(val) = var("LLM_ENDPOINT") {
            self.endpoint = Some(val);
        }
        if let Some(val) = var("LLM_MODEL") {
            self.model = Some(val);
        }
        if let Some(n) = var("LLM_MAX_TOKENS").and_then(|v| v.parse().ok()) {
            self.max_tokens = n;
        }
        if let Some(t) = var("LLM_TEMPERATURE").and_then(|v| v.parse().ok()) {
            self.temperature = t;
        }
        if let Some(n) = var("LLM_TIMEOUT").and_then(|v| v.parse().ok()) {
            self.timeout_secs = n;
        }
        self
    }

    /// Changing provider drops an endpoint and model chosen for the old one.
    fn switch_provider(&mut self, provider: LlmProvider) {
        if self.provider != provider {
            self.provider = provider;
            self.endpoint = None;
            self.model = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn with_vars(vars: &[(&str, &str)]) -> LlmConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        LlmConfig::default().with_overrides(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_default_is_not_configured() {
        let config = with_vars(&[]);
        assert!(!config.enabled);
        assert!(!config.is_configured());
        assert_eq!(config.max_tokens, 500);
        assert!((config.temperature - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn test_gemini_key_autodetected() {
        let config = with_vars(&[("GEMINI_API_KEY", "abc")]);
        assert_eq!(config.provider, LlmProvider::Gemini);
        assert_eq!(config.model(), "gemini-2.5-flash");
        assert_eq!(config.endpoint(), "https://generativelanguage.googleapis.com");
        assert!(config.is_configured());
    }

    #[test]
    fn test_explicit_provider_wins() {
        let config = with_vars(&[
            ("LLM_PROVIDER", "openai"),
            ("GEMINI_API_KEY", "g"),
            ("OPENAI_API_KEY", "o"),
        ]);
        assert_eq!(config.provider, LlmProvider::OpenAI);
        assert_eq!(config.api_key.as_deref(), Some("o"));
        assert_eq!(config.endpoint(), "https://api.openai.com");
    }

    #[test]
    fn test_hosted_provider_without_key_is_not_configured() {
        let config = with_vars(&[("LLM_PROVIDER", "groq")]);
        assert!(config.enabled);
        assert!(!config.is_configured());
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let config = with_vars(&[("LLM_PROVIDER", "ollama"), ("LLM_MODEL", "qwen2.5")]);
        assert!(config.is_configured());
        assert_eq!(config.model(), "qwen2.5");
        assert_eq!(config.endpoint(), "http://localhost:11434");
    }

    #[test]
    fn test_explicit_disable() {
        let config = with_vars(&[("GEMINI_API_KEY", "abc"), ("LLM_ENABLED", "false")]);
        assert!(!config.is_configured());
    }

    #[test]
    fn test_file_provider_resolves_own_defaults() {
        let config: LlmConfig =
            toml::from_str("enabled = true\nprovider = \"gemini\"\napi_key = \"k\"").unwrap();
        assert!(config.is_configured());
        assert_eq!(config.endpoint(), "https://generativelanguage.googleapis.com");
        assert_eq!(config.model(), "gemini-2.5-flash");

        let config: LlmConfig = toml::from_str("provider = \"groq\"").unwrap();
        assert_eq!(config.provider, LlmProvider::Groq);
        assert!(config.provider.is_openai_compatible());
        assert_eq!(config.endpoint(), "https://api.groq.com/openai");
    }

    #[test]
    fn test_explicit_endpoint_and_model_kept() {
        let config: LlmConfig = toml::from_str(
            "provider = \"openai\"\nendpoint = \"http://proxy.local/\"\nmodel = \"gpt-4o\"",
        )
        .unwrap();
        assert_eq!(config.endpoint(), "http://proxy.local");
        assert_eq!(config.model(), "gpt-4o");
    }

    #[test]
    fn test_env_provider_switch_drops_file_model() {
        let file = LlmConfig {
            model: Some("qwen2.5".to_string()),
            ..LlmConfig::default()
        };
        let config = file.with_overrides(|name| match name {
            "LLM_PROVIDER" => Some("gemini".to_string()),
            "GEMINI_API_KEY" => Some("g".to_string()),
            _ => None,
        });
        assert_eq!(config.model(), "gemini-2.5-flash");
        assert_eq!(config.api_key.as_deref(), Some("g"));
    }
}
