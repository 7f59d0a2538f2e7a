//! Mock LLM provider for testing

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::provider::{LlmError, LlmProvider, LlmRequest, LlmResponse};

/// A mock LLM provider that returns predefined responses.
/// Lets the pipeline run without a hosted model.
#[derive(Debug)]
pub struct MockProvider {
    /// Name of this mock
    pub name: String,
    /// Canned responses (cycles through them)
    responses: Vec<String>,
    /// Current response index
    index: AtomicUsize,
    /// Simulated latency
    latency: Duration,
    /// When set, every call fails with this message
    failure: Option<String>,
    /// Prompts received, oldest first
    prompts: Mutex<Vec<String>>,
}

impl MockProvider {
    /// Create a new mock provider with given responses
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            name: "mock".to_string(),
            responses,
            index: AtomicUsize::new(0),
            latency: Duration::from_millis(10),
            failure: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock that always returns the same response
    pub fn constant(response: &str) -> Self {
        Self::new(vec![response.to_string()])
    }

    /// Create a mock whose every call fails as if the service were down
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::new(vec![])
        }
    }

    /// Create a mock that answers feedback prompts with valid JSON and
    /// everything else with a short rebuttal
    pub fn smart() -> Self {
        Self {
            name: "smart-mock".to_string(),
            ..Self::new(vec![])
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Number of completed or failed calls so far
    pub fn call_count(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    fn generate_smart_response(&self, request: &LlmRequest) -> String {
        if request.prompt.contains("JSON") {
            return serde_json::json!({
                "score": 7,
                "strengths": ["States a clear position"],
                "improvements": ["Support the claim with data"],
                "counterarguments": ["The opposing side may question the premise"],
                "evidence_suggestions": ["Peer-reviewed studies"],
                "overall_feedback": "A reasonable start; add evidence and address rebuttals.",
                "ideal_answer": "A complete argument states the claim, supports it with evidence, and answers the strongest objection."
            })
            .to_string();
        }

        "That's an interesting point, but consider the other side: the evidence is more mixed \
         than it first appears. How would your argument hold up if the key assumption were false?"
            .to_string()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn is_available(&self) -> bool {
        self.failure.is_none()
    }

    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let start = Instant::now();

        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(request.prompt.clone());
        }

        tokio::time::sleep(self.latency).await;

        if let Some(message) = &self.failure {
            return Err(LlmError::ConnectionFailed(message.clone()));
        }

        let content = if self.responses.is_empty() {
            self.generate_smart_response(&request)
        } else {
            let idx = self.index.fetch_add(1, Ordering::Relaxed);
            self.responses[idx % self.responses.len()].clone()
        };

        Ok(LlmResponse {
            content,
            model: self.name.clone(),
            tokens_used: Some((request.prompt.len() / 4) as u32 + 100),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_provider() {
        let mock = MockProvider::constant("Hello, world!");
        let response = mock.ask("test").await.unwrap();
        assert_eq!(response, "Hello, world!");
        assert_eq!(mock.call_count(), 1);
        assert_eq!(mock.prompts(), vec!["test"]);
    }

    #[tokio::test]
    async fn test_cycles_responses() {
        let mock = MockProvider::new(vec!["one".to_string(), "two".to_string()]);
        assert_eq!(mock.ask("a").await.unwrap(), "one");
        assert_eq!(mock.ask("b").await.unwrap(), "two");
        assert_eq!(mock.ask("c").await.unwrap(), "one");
    }

    #[tokio::test]
    async fn test_smart_mock_feedback_is_json() {
        let mock = MockProvider::smart();
        let response = mock.ask("Return ONLY a valid JSON object").await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&response).unwrap();
        assert_eq!(value["score"], 7);

        let rebuttal = mock.ask("Provide a counter-response").await.unwrap();
        assert!(rebuttal.ends_with('?'));
    }

    #[tokio::test]
    async fn test_failing_mock() {
        let mock = MockProvider::failing("quota exceeded");
        assert!(!mock.is_available().await);
        let err = mock.ask("anything").await.unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
    }
}
