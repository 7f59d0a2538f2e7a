//! Google Gemini provider (`generateContent` REST API)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::provider::{
    decode_error, status_error, transport_error, LlmError, LlmProvider, LlmRequest, LlmResponse,
};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    model_version: Option<String>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    total_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Gemini provider
#[derive(Debug)]
pub struct GeminiProvider {
    /// API key, sent in the `x-goog-api-key` header
    api_key: String,
    /// Model to use (e.g., "gemini-1.5-flash")
    model: String,
    /// HTTP client
    client: reqwest::Client,
    /// Base URL
    base_url: String,
    /// Per-request timeout
    timeout: Duration,
}

impl GeminiProvider {
    /// Create a new Gemini provider
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Create with the Flash model
    pub fn flash(api_key: &str) -> Self {
        Self::new(api_key, "gemini-1.5-flash")
    }

    /// Point at a different endpoint (proxies, tests)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn is_available(&self) -> bool {
        self.client
            .get(format!("{}/v1beta/models", self.base_url))
            .header(API_KEY_HEADER, &self.api_key)
            .timeout(self.timeout)
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let start = Instant::now();
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model);
        let timeout_ms = self.timeout.as_millis() as u64;

        let body = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: request.system,
                }],
            },
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: request.prompt,
                }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            },
        };

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(e, timeout_ms))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, body));
        }

        let api_response: GenerateResponse = response
            .json()
            .await
            .map_err(decode_error)?;

        if let Some(reason) = api_response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            return Err(LlmError::InvalidResponse(format!("Prompt blocked: {}", reason)));
        }

        let content: String = api_response
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.iter().map(|p| p.text.as_str()).collect())
            .ok_or_else(|| LlmError::InvalidResponse("No candidates in response".to_string()))?;

        Ok(LlmResponse {
            content,
            model: api_response.model_version.unwrap_or_else(|| self.model.clone()),
            tokens_used: api_response.usage_metadata.and_then(|u| u.total_token_count),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_generate_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "Hello "}, {"text": "there"}]}
                }],
                "usageMetadata": {"totalTokenCount": 12},
                "modelVersion": "gemini-1.5-flash-002"
            })))
            .mount(&server)
            .await;

        let provider = GeminiProvider::flash("test-key").with_base_url(&server.uri());
        let response = provider.complete(LlmRequest::simple("hi")).await.unwrap();

        assert_eq!(response.content, "Hello there");
        assert_eq!(response.tokens_used, Some(12));
        assert_eq!(response.model, "gemini-1.5-flash-002");
    }

    #[tokio::test]
    async fn test_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key invalid"))
            .mount(&server)
            .await;

        let provider = GeminiProvider::flash("bad-key").with_base_url(&server.uri());
        let err = provider.ask("hi").await.unwrap_err();
        assert!(matches!(err, LlmError::RequestFailed(ref msg) if msg.contains("403")));
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let provider = GeminiProvider::flash("key").with_base_url(&server.uri());
        assert!(matches!(provider.ask("hi").await, Err(LlmError::RateLimited)));
    }

    #[tokio::test]
    async fn test_blocked_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&server)
            .await;

        let provider = GeminiProvider::flash("key").with_base_url(&server.uri());
        let err = provider.ask("hi").await.unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(ref msg) if msg.contains("SAFETY")));
    }

    #[tokio::test]
    async fn test_connection_error_hides_api_key() {
        let provider = GeminiProvider::flash("SECRET-KEY-123")
            .with_base_url("http://127.0.0.1:9")
            .with_timeout(Duration::from_secs(2));
        let err = provider.ask("hi").await.unwrap_err();

        assert!(matches!(err, LlmError::ConnectionFailed(_) | LlmError::Timeout(_)));
        assert!(!err.to_string().contains("SECRET-KEY-123"), "leaked key: {}", err);
    }

    #[tokio::test]
    async fn test_decode_error_hides_api_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let provider = GeminiProvider::flash("SECRET-KEY-123").with_base_url(&server.uri());
        let err = provider.ask("hi").await.unwrap_err();

        assert!(matches!(err, LlmError::InvalidResponse(_)));
        assert!(!err.to_string().contains("SECRET-KEY-123"));
    }

    #[tokio::test]
    async fn test_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let provider = GeminiProvider::flash("key")
            .with_base_url(&server.uri())
            .with_timeout(Duration::from_millis(50));
        assert!(matches!(provider.ask("hi").await, Err(LlmError::Timeout(50))));
    }
}
