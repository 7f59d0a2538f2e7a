//! # Debate Coach Core
//!
//! Core types and pure pipeline stages for the debate coach:
//! - [`Position`], [`Message`], [`Transcript`] - the shape of a debate
//! - [`FeedbackRecord`] - structured coaching feedback
//! - [`normalize`] - turns raw LLM text into a [`FeedbackRecord`]
//! - [`splice`] - enriches a record with search evidence
//! - [`SessionStore`] - per-(user, topic) transcripts

pub mod debate;
pub mod error;
pub mod evidence;
pub mod feedback;
pub mod normalize;
pub mod practice;
pub mod session;
pub mod splice;

pub use debate::{DebateRecord, DebateTurn, Message, Opening, Position, Sender, SessionKey, Transcript};
pub use error::CoachError;
pub use evidence::EvidenceItem;
pub use feedback::{FeedbackOutcome, FeedbackRecord, Provenance};
pub use normalize::{fallback_record, normalize, parse_feedback, strip_code_fence, NormalizeError};
pub use practice::{practice_question, PracticeQuestion};
pub use session::{SessionGuard, SessionStore};
pub use splice::{splice, MIN_SNIPPET_CHARS};
