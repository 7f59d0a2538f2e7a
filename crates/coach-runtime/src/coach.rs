//! Debate pipeline: evidence, completion, normalization, splicing, sessions

use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use coach_core::{
    normalize, splice, CoachError, DebateRecord, DebateTurn, FeedbackOutcome, Opening, Position,
    Sender, SessionStore,
};
use coach_evidence::EvidenceFetcher;
use coach_persist::{ChatSessionStore, DebateSink};

use crate::prompts::{counter_query, feedback_query};
use crate::requester::CompletionRequester;

/// Feedback for one analyzed message
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Id of the persisted debate record
    pub debate_id: Uuid,
    pub outcome: FeedbackOutcome,
}

/// Result of a full conversational exchange
#[derive(Debug, Clone)]
pub struct Exchange {
    pub debate_id: Uuid,
    pub feedback: FeedbackOutcome,
    /// The AI's counter-argument
    pub rebuttal: String,
    /// Transcript length after both messages were appended
    pub transcript_len: usize,
}

/// The debate coach pipeline.
///
/// Cheap to clone; every clone shares the same session store and sinks.
#[derive(Debug, Clone)]
pub struct DebateCoach {
    requester: CompletionRequester,
    evidence: EvidenceFetcher,
    evidence_limit: usize,
    sessions: Arc<SessionStore>,
    sink: Option<Arc<dyn DebateSink>>,
    snapshots: Option<ChatSessionStore>,
}

impl DebateCoach {
    pub fn new(
        requester: CompletionRequester,
        evidence: EvidenceFetcher,
        evidence_limit: usize,
        sessions: Arc<SessionStore>,
    ) -> Self {
        Self {
            requester,
            evidence,
            evidence_limit,
            sessions,
            sink: None,
            snapshots: None,
        }
    }

    /// Persist a [`DebateRecord`] for every analyzed message
    pub fn with_sink(mut self, sink: Arc<dyn DebateSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Snapshot transcripts after every exchange
    pub fn with_snapshots(mut self, store: ChatSessionStore) -> Self {
        self.snapshots = Some(store);
        self
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    pub fn provider_name(&self) -> &str {
        self.requester.provider_name()
    }

    /// Open a debate: the AI takes the other side and invites an argument
    pub fn start(&self, topic: &str, position: &str) -> Result<Opening, CoachError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(CoachError::InvalidInput("missing required field: topic".to_string()));
        }
        let position: Position = position.parse()?;
        Ok(Opening::new(topic, position))
    }

    /// Analyze one message without touching its transcript.
    ///
    /// The transcript for the turn's key is still read for prompt context.
    #[instrument(skip(self, turn), fields(user_id = %turn.user_id, topic = %turn.topic))]
    pub async fn analyze(&self, turn: &DebateTurn) -> Result<Analysis, CoachError> {
        let history = self.sessions.history(&turn.session_key()).await;
        let outcome = self.feedback(turn, &history).await?;
        let debate_id = self.persist(turn, &outcome);
        Ok(Analysis { debate_id, outcome })
    }

    /// Feedback plus rebuttal, appended to the transcript as one unit.
    ///
    /// Holds the session lock for the whole exchange, so same-key exchanges
    /// land in arrival order. Nothing is appended when either completion
    /// fails.
    #[instrument(skip(self, turn), fields(user_id = %turn.user_id, topic = %turn.topic))]
    pub async fn exchange(&self, turn: &DebateTurn) -> Result<Exchange, CoachError> {
        let key = turn.session_key();
        let mut session = self.sessions.lock(&key).await;
        let history = session.messages().to_vec();

        let feedback = self.feedback(turn, &history).await?;

        let counter_evidence = self
            .evidence
            .fetch(&counter_query(&turn.topic, turn.ai_position()), self.evidence_limit)
            .await;
        let rebuttal = self
            .requester
            .request_counter(turn, &history, &counter_evidence)
            .await?;

        session.push(Sender::User, turn.message.as_str());
        session.push(Sender::Ai, rebuttal.as_str());
        let transcript_len = session.len();

        if let Some(store) = &self.snapshots {
            let store = store.clone();
            let snapshot = (*session).clone();
            let key = key.clone();
            tokio::spawn(async move {
                if let Err(e) = store.save(&key, &snapshot).await {
                    warn!(session = %key, error = %e, "Failed to snapshot chat session");
                }
            });
        }
        drop(session);

        let debate_id = self.persist(turn, &feedback);
        info!(
            session = %key,
            score = feedback.record.score,
            fallback = feedback.is_fallback(),
            transcript_len,
            "Exchange complete"
        );

        Ok(Exchange {
            debate_id,
            feedback,
            rebuttal,
            transcript_len,
        })
    }

    async fn feedback(
        &self,
        turn: &DebateTurn,
        history: &[coach_core::Message],
    ) -> Result<FeedbackOutcome, CoachError> {
        let evidence = self
            .evidence
            .fetch(&feedback_query(&turn.topic), self.evidence_limit)
            .await;
        let raw = self.requester.request_feedback(turn, history, &evidence).await?;

        let FeedbackOutcome { record, provenance } = normalize(&raw, &turn.topic, turn.position);
        Ok(FeedbackOutcome {
            record: splice(record, &evidence),
            provenance,
        })
    }

    /// Hand the record to the sink in the background. Failures are logged.
    fn persist(&self, turn: &DebateTurn, outcome: &FeedbackOutcome) -> Uuid {
        let record = DebateRecord::new(turn, &outcome.record);
        let id = record.id;

        if let Some(sink) = &self.sink {
            let sink = sink.clone();
            tokio::spawn(async move {
                if let Err(e) = sink.record(&record).await {
                    warn!(debate_id = %record.id, error = %e, "Failed to persist debate record");
                }
            });
        }
        id
    }
}
