//! Response normalization
//!
//! Converts the free text returned by a completion service into a
//! [`FeedbackRecord`]. Parsing is strict: a reply that is not a JSON object
//! with every required key (after light repair) is rejected as a whole, and
//! [`normalize`] substitutes [`fallback_record`] for it.

use thiserror::Error;
use tracing::{debug, warn};

use crate::debate::Position;
use crate::feedback::{FeedbackOutcome, FeedbackRecord, Provenance};

/// Score given by the fallback record
pub const FALLBACK_SCORE: u8 = 7;

/// Why a reply could not be turned into a record
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("Malformed completion: empty reply")]
    Empty,

    #[error("Malformed completion: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Remove a surrounding markdown code fence, with or without a language tag.
///
/// Text that is not fenced is returned trimmed but otherwise untouched.
pub fn strip_code_fence(raw: &str) -> &str {
    let text = raw.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    let rest = rest.trim();
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Strictly parse a reply into a record.
///
/// Tries the fence-stripped text first. If that fails and the text has
/// prose around a `{ ... }` span, that span is tried once.
pub fn parse_feedback(raw: &str) -> Result<FeedbackRecord, NormalizeError> {
    let text = strip_code_fence(raw);
    if text.is_empty() {
        return Err(NormalizeError::Empty);
    }

    let first_error = match serde_json::from_str::<FeedbackRecord>(text) {
        Ok(record) => return Ok(record),
        Err(e) => e,
    };

    match embedded_object(text) {
        Some(span) if span.len() < text.len() => {
            debug!("Retrying parse on embedded JSON object");
            serde_json::from_str::<FeedbackRecord>(span).map_err(NormalizeError::from)
        }
        _ => Err(first_error.into()),
    }
}

fn embedded_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// The deterministic record used when a reply cannot be parsed
pub fn fallback_record(topic: &str, position: Position) -> FeedbackRecord {
    FeedbackRecord {
        score: FALLBACK_SCORE,
        strengths: vec![
            "Clear argument presentation".to_string(),
            "Relevant to the topic".to_string(),
        ],
        improvements: vec![
            "Add more specific evidence".to_string(),
            "Address counterarguments".to_string(),
        ],
        counterarguments: vec![
            "Opponents may argue differently".to_string(),
            "Alternative perspectives exist".to_string(),
        ],
        evidence_suggestions: vec![
            "Statistical data needed".to_string(),
            "Expert opinions would help".to_string(),
        ],
        overall_feedback: format!(
            "Your argument on {} shows good understanding. Consider strengthening with more evidence.",
            topic
        ),
        ideal_answer: format!(
            "A stronger argument would include specific examples and data to support your {} position on {}.",
            position, topic
        ),
    }
}

/// Turn a raw reply into a complete record. Never fails.
pub fn normalize(raw: &str, topic: &str, position: Position) -> FeedbackOutcome {
    match parse_feedback(raw) {
        Ok(record) => FeedbackOutcome {
            record,
            provenance: Provenance::Model,
        },
        Err(e) => {
            let preview: String = raw.chars().take(200).collect();
            warn!(error = %e, preview = %preview, "Completion could not be parsed, using fallback feedback");
            FeedbackOutcome {
                record: fallback_record(topic, position),
                provenance: Provenance::Fallback,
            }
        }
    }
}
