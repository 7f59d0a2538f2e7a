//! Search evidence

use serde::{Deserialize, Serialize};

/// A short factual snippet with its source label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub title: String,
    pub snippet: String,
    /// URL when known, otherwise a generic label
    pub source: String,
}

impl EvidenceItem {
    pub fn new(title: impl Into<String>, snippet: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            snippet: snippet.into(),
            source: source.into(),
        }
    }
}
