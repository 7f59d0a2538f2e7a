//! Evidence fetcher: timeout and graceful degradation around a source

use coach_core::EvidenceItem;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::source::{EvidenceError, EvidenceSource};

/// Wraps an [`EvidenceSource`] so that a fetch never fails.
///
/// Evidence is an enhancement: errors and timeouts are logged and turned
/// into an empty list. One attempt per call, no retries.
#[derive(Debug, Clone)]
pub struct EvidenceFetcher {
    source: Arc<dyn EvidenceSource>,
    timeout: Duration,
}

impl EvidenceFetcher {
    pub fn new(source: Arc<dyn EvidenceSource>, timeout: Duration) -> Self {
        Self { source, timeout }
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Fetch at most `limit` items for `query`, best first
    pub async fn fetch(&self, query: &str, limit: usize) -> Vec<EvidenceItem> {
        if limit == 0 {
            return Vec::new();
        }

        let start = Instant::now();
        let result = match tokio::time::timeout(self.timeout, self.source.search(query, limit)).await {
            Ok(result) => result,
            Err(_) => Err(EvidenceError::Timeout(self.timeout.as_millis() as u64)),
        };

        match result {
            Ok(mut items) => {
                items.truncate(limit);
                debug!(
                    source = %self.source.name(),
                    count = items.len(),
                    latency_ms = start.elapsed().as_millis() as u64,
                    "Fetched evidence"
                );
                items
            }
            Err(e) => {
                warn!(source = %self.source.name(), query = %query, error = %e, "Evidence fetch failed");
                Vec::new()
            }
        }
    }
}
