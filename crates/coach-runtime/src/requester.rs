//! Completion requester - one bounded LLM call per request

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use coach_core::{CoachError, DebateTurn, EvidenceItem, Message};
use coach_llm::{LlmProvider, LlmRequest};

use crate::prompts::{counter_prompt, feedback_prompt, COACH_ROLE, OPPONENT_ROLE};

/// Sends feedback and counter-argument prompts to the configured provider.
///
/// Every failure, including the completion timeout, surfaces as
/// [`CoachError::ExternalService`]. There is no retry.
#[derive(Debug, Clone)]
pub struct CompletionRequester {
    llm: Arc<dyn LlmProvider>,
    timeout: Duration,
}

impl CompletionRequester {
    pub fn new(llm: Arc<dyn LlmProvider>, timeout: Duration) -> Self {
        Self { llm, timeout }
    }

    pub fn provider_name(&self) -> &str {
        self.llm.name()
    }

    /// Raw feedback text for `turn`, expected to be a JSON object
    pub async fn request_feedback(
        &self,
        turn: &DebateTurn,
        history: &[Message],
        evidence: &[EvidenceItem],
    ) -> Result<String, CoachError> {
        let request = LlmRequest::with_role(COACH_ROLE, &feedback_prompt(turn, history, evidence))
            .temperature(0.4)
            .max_tokens(2048);
        self.complete("feedback", request).await
    }

    /// Raw rebuttal text arguing the AI's side
    pub async fn request_counter(
        &self,
        turn: &DebateTurn,
        history: &[Message],
        evidence: &[EvidenceItem],
    ) -> Result<String, CoachError> {
        let request = LlmRequest::with_role(OPPONENT_ROLE, &counter_prompt(turn, history, evidence))
            .temperature(0.7)
            .max_tokens(1024);
        self.complete("counter", request).await
    }

    async fn complete(&self, kind: &str, request: LlmRequest) -> Result<String, CoachError> {
        let provider = self.llm.name().to_string();

        match tokio::time::timeout(self.timeout, self.llm.complete(request)).await {
            Ok(Ok(response)) => {
                debug!(
                    provider = %provider,
                    kind = kind,
                    latency_ms = response.latency_ms,
                    tokens = ?response.tokens_used,
                    "Completion received"
                );
                Ok(response.content)
            }
            Ok(Err(e)) => {
                warn!(provider = %provider, kind = kind, error = %e, "Completion failed");
                Err(CoachError::ExternalService(format!("{}: {}", provider, e)))
            }
            Err(_) => {
                warn!(provider = %provider, kind = kind, timeout_secs = self.timeout.as_secs(), "Completion timed out");
                Err(CoachError::ExternalService(format!(
                    "{}: timed out after {} ms",
                    provider,
                    self.timeout.as_millis()
                )))
            }
        }
    }
}
