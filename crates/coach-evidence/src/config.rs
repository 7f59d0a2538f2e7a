//! Evidence configuration

use std::env;
use std::sync::Arc;
use std::time::Duration;

use crate::fetcher::EvidenceFetcher;
use crate::scrape::ScrapeSource;
use crate::serpapi::SerpApiSource;
use crate::source::EvidenceSource;

/// Upper bound on the evidence timeout; evidence is optional and must not
/// hold up a request for long.
pub const MAX_EVIDENCE_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone)]
pub struct EvidenceConfig {
    /// SerpApi key (env: SERPAPI_KEY). Without it the scraping source is used.
    pub serpapi_key: Option<String>,
    /// Fetch timeout in seconds (env: COACH_EVIDENCE_TIMEOUT_SECS), capped at 5
    pub timeout_secs: u64,
    /// Items per query (env: COACH_EVIDENCE_LIMIT)
    pub limit: usize,
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self {
            serpapi_key: None,
            timeout_secs: MAX_EVIDENCE_TIMEOUT_SECS,
            limit: 3,
        }
    }
}

impl EvidenceConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            serpapi_key: env::var("SERPAPI_KEY").ok().filter(|k| !k.trim().is_empty()),
            timeout_secs: env::var("COACH_EVIDENCE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout_secs),
            limit: env::var("COACH_EVIDENCE_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.limit),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.clamp(1, MAX_EVIDENCE_TIMEOUT_SECS))
    }

    /// Pick the source once, at construction time
    pub fn build_fetcher(&self) -> EvidenceFetcher {
        let timeout = self.timeout();
        let source: Arc<dyn EvidenceSource> = match &self.serpapi_key {
            Some(key) => {
                tracing::info!("Using SerpApi evidence source");
                Arc::new(SerpApiSource::new(key).with_timeout(timeout))
            }
            None => {
                tracing::info!("SERPAPI_KEY not set, using scraping evidence source");
                Arc::new(ScrapeSource::new().with_timeout(timeout))
            }
        };
        EvidenceFetcher::new(source, timeout)
    }
}
