//! Pipeline configuration

use std::sync::Arc;

use coach_core::SessionStore;
use coach_evidence::EvidenceConfig;
use coach_llm::{ConfigError, LlmConfig};

use crate::coach::DebateCoach;
use crate::requester::CompletionRequester;

/// Everything needed to assemble a [`DebateCoach`]
#[derive(Debug, Clone, Default)]
pub struct CoachConfig {
    pub llm: LlmConfig,
    pub evidence: EvidenceConfig,
}

impl CoachConfig {
    pub fn from_env() -> Self {
        Self {
            llm: LlmConfig::from_env(),
            evidence: EvidenceConfig::from_env(),
        }
    }

    /// Pick the completion provider and evidence source, and wire them to
    /// `sessions`
    pub fn build(&self, sessions: Arc<SessionStore>) -> Result<DebateCoach, ConfigError> {
        let requester = CompletionRequester::new(self.llm.build_provider()?, self.llm.timeout());
        Ok(DebateCoach::new(
            requester,
            self.evidence.build_fetcher(),
            self.evidence.limit,
            sessions,
        ))
    }
}
