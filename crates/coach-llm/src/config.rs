//! Provider configuration
//!
//! Handles API keys and provider selection. Keys only ever come from the
//! environment.

use serde::{Deserialize, Serialize};
use std::env;
use std::sync::Arc;
use std::time::Duration;

use crate::{GeminiProvider, LlmProvider, MockProvider, OpenAIProvider, UnconfiguredProvider};

/// Error types for configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Gemini API key (env: GEMINI_API_KEY)
    pub gemini_api_key: Option<String>,
    /// OpenAI API key (env: OPENAI_API_KEY)
    pub openai_api_key: Option<String>,
    /// Explicit provider choice (env: COACH_PROVIDER)
    pub provider: Option<String>,
    /// Model override (env: COACH_MODEL)
    pub model: Option<String>,
    /// Completion timeout in seconds (env: COACH_COMPLETION_TIMEOUT_SECS)
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            openai_api_key: None,
            provider: None,
            model: None,
            timeout_secs: 60,
        }
    }
}

impl LlmConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            gemini_api_key: non_empty_var("GEMINI_API_KEY"),
            openai_api_key: non_empty_var("OPENAI_API_KEY"),
            provider: non_empty_var("COACH_PROVIDER").map(|p| p.to_lowercase()),
            model: non_empty_var("COACH_MODEL"),
            timeout_secs: env::var("COACH_COMPLETION_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The provider that [`build_provider`](Self::build_provider) will pick
    pub fn resolved_provider(&self) -> &str {
        match self.provider.as_deref() {
            Some(p) => p,
            None if self.gemini_api_key.is_some() => "gemini",
            None if self.openai_api_key.is_some() => "openai",
            None => "none",
        }
    }

    /// Build the configured provider.
    ///
    /// Without an explicit choice, Gemini wins over OpenAI. With no key at
    /// all every completion fails; the mock is only used when asked for.
    pub fn build_provider(&self) -> Result<Arc<dyn LlmProvider>, ConfigError> {
        let timeout = self.timeout();
        match self.resolved_provider() {
            "gemini" => {
                let key = self
                    .gemini_api_key
                    .as_deref()
                    .ok_or_else(|| ConfigError::MissingEnvVar("GEMINI_API_KEY".to_string()))?;
                let model = self.model.as_deref().unwrap_or("gemini-1.5-flash");
                tracing::info!(model = %model, "Using Gemini completion provider");
                Ok(Arc::new(GeminiProvider::new(key, model).with_timeout(timeout)))
            }
            "openai" => {
                let key = self
                    .openai_api_key
                    .as_deref()
                    .ok_or_else(|| ConfigError::MissingEnvVar("OPENAI_API_KEY".to_string()))?;
                let model = self.model.as_deref().unwrap_or("gpt-3.5-turbo");
                tracing::info!(model = %model, "Using OpenAI completion provider");
                Ok(Arc::new(OpenAIProvider::new(key, model).with_timeout(timeout)))
            }
            "mock" => {
                tracing::warn!("COACH_PROVIDER=mock: feedback is canned, not model output");
                Ok(Arc::new(MockProvider::smart()))
            }
            "none" => {
                tracing::warn!(
                    "No LLM API key configured (GEMINI_API_KEY or OPENAI_API_KEY); completions will fail"
                );
                Ok(Arc::new(UnconfiguredProvider))
            }
            other => Err(ConfigError::Invalid(format!("Unknown provider: {}", other))),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unconfigured() {
        let config = LlmConfig::default();
        assert_eq!(config.resolved_provider(), "none");
        assert_eq!(config.build_provider().unwrap().name(), "unconfigured");
    }

    #[tokio::test]
    async fn test_keyless_provider_refuses_completions() {
        let provider = LlmConfig::default().build_provider().unwrap();
        assert!(matches!(
            provider.ask("Return ONLY a valid JSON object").await,
            Err(crate::LlmError::NotAvailable)
        ));
    }

    #[test]
    fn test_mock_is_opt_in() {
        let config = LlmConfig {
            provider: Some("mock".to_string()),
            ..Default::default()
        };
        assert_eq!(config.build_provider().unwrap().name(), "smart-mock");
    }

    #[test]
    fn test_gemini_preferred() {
        let config = LlmConfig {
            gemini_api_key: Some("g".to_string()),
            openai_api_key: Some("o".to_string()),
            ..Default::default()
        };
        assert_eq!(config.build_provider().unwrap().name(), "gemini");
    }

    #[test]
    fn test_explicit_provider_requires_key() {
        let config = LlmConfig {
            provider: Some("openai".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            config.build_provider(),
            Err(ConfigError::MissingEnvVar(v)) if v == "OPENAI_API_KEY"
        ));
    }

    #[test]
    fn test_unknown_provider() {
        let config = LlmConfig {
            provider: Some("deepthought".to_string()),
            ..Default::default()
        };
        assert!(matches!(config.build_provider(), Err(ConfigError::Invalid(_))));
    }
}
