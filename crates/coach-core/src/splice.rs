//! Evidence splicing

use crate::evidence::EvidenceItem;
use crate::feedback::FeedbackRecord;

/// A snippet must be longer than this many characters to be spliced in
pub const MIN_SNIPPET_CHARS: usize = 20;

/// Append the top-ranked snippet to `ideal_answer` when it is informative
/// enough. Only the first item is ever considered, and its length is taken
/// as delivered by the source, surrounding whitespace included.
pub fn splice(mut record: FeedbackRecord, evidence: &[EvidenceItem]) -> FeedbackRecord {
    if let Some(first) = evidence.first() {
        if first.snippet.chars().count() > MIN_SNIPPET_CHARS {
            record.ideal_answer.push_str(" According to recent research, ");
            record.ideal_answer.push_str(&first.snippet);
        }
    }
    record
}
