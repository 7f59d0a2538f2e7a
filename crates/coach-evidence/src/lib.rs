//! # Debate Coach Evidence
//!
//! Fetches short factual snippets for a debate topic.
//!
//! Two [`EvidenceSource`] implementations exist: [`SerpApiSource`] for the
//! keyed SerpApi service and [`ScrapeSource`] for an unauthenticated search
//! page. [`EvidenceConfig`] picks one at construction time and
//! [`EvidenceFetcher`] wraps it with a timeout and the "never fail" policy.

pub mod config;
pub mod fetcher;
pub mod scrape;
pub mod serpapi;
pub mod source;

pub use config::EvidenceConfig;
pub use fetcher::EvidenceFetcher;
pub use scrape::ScrapeSource;
pub use serpapi::SerpApiSource;
pub use source::{EvidenceError, EvidenceSource, NoEvidence, StaticSource};
