//! Evidence source trait and simple implementations

use async_trait::async_trait;
use coach_core::EvidenceItem;
use thiserror::Error;

/// Why a source produced no evidence.
///
/// Never reaches callers of the pipeline; [`crate::EvidenceFetcher`] turns
/// every variant into an empty list.
#[derive(Debug, Error)]
pub enum EvidenceError {
    #[error("Evidence unavailable: connection failed: {0}")]
    Connection(String),
    #[error("Evidence unavailable: search returned status {0}")]
    Status(u16),
    #[error("Evidence unavailable: could not parse results: {0}")]
    Parse(String),
    #[error("Evidence unavailable: timed out after {0} ms")]
    Timeout(u64),
}

// The request URL is dropped: SerpApi carries its key in the query string.
impl From<reqwest::Error> for EvidenceError {
    fn from(e: reqwest::Error) -> Self {
        let e = e.without_url();
        if e.is_decode() {
            EvidenceError::Parse(e.to_string())
        } else {
            EvidenceError::Connection(e.to_string())
        }
    }
}

/// A search backend that turns a query into ranked evidence
#[async_trait]
pub trait EvidenceSource: Send + Sync + std::fmt::Debug {
    /// Source name for logs
    fn name(&self) -> &str;

    /// Return at most `limit` items, best first
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<EvidenceItem>, EvidenceError>;
}

/// A source that never finds anything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoEvidence;

#[async_trait]
impl EvidenceSource for NoEvidence {
    fn name(&self) -> &str {
        "none"
    }

    async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<EvidenceItem>, EvidenceError> {
        Ok(Vec::new())
    }
}

/// A source with fixed results, for tests and offline development
#[derive(Debug, Default, Clone)]
pub struct StaticSource {
    items: Vec<EvidenceItem>,
}

impl StaticSource {
    pub fn new(items: Vec<EvidenceItem>) -> Self {
        Self { items }
    }
}

#[async_trait]
impl EvidenceSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn search(&self, _query: &str, limit: usize) -> Result<Vec<EvidenceItem>, EvidenceError> {
        Ok(self.items.iter().take(limit).cloned().collect())
    }
}
