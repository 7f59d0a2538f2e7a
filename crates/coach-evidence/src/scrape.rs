//! Unauthenticated search-page scraping source
//!
//! Used when no SerpApi key is configured. Results page markup changes
//! without notice, so this is best effort: anything that does not match
//! the known snippet containers is simply not returned.

use async_trait::async_trait;
use coach_core::EvidenceItem;
use scraper::{Html, Selector};
use std::time::Duration;

use crate::source::{EvidenceError, EvidenceSource};

const DEFAULT_BASE_URL: &str = "https://www.google.com";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Snippet containers on the results page, old layout first
const SNIPPET_SELECTOR: &str = "span.aCOpRe, div.VwiC3b";

const SCRAPED_TITLE: &str = "Search Result";
const SCRAPED_SOURCE: &str = "Google Search";

/// Scrapes snippet text from a public search results page
#[derive(Debug)]
pub struct ScrapeSource {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl Default for ScrapeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrapeSource {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl EvidenceSource for ScrapeSource {
    fn name(&self) -> &str {
        "scrape"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<EvidenceItem>, EvidenceError> {
        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("q", query)])
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EvidenceError::Timeout(self.timeout.as_millis() as u64)
                } else {
                    EvidenceError::from(e)
                }
            })?;

        if !response.status().is_success() {
            return Err(EvidenceError::Status(response.status().as_u16()));
        }

        let html = response.text().await?;
        extract_snippets(&html, limit)
    }
}

/// Pull snippet text out of a results page, in page order
pub fn extract_snippets(html: &str, limit: usize) -> Result<Vec<EvidenceItem>, EvidenceError> {
    let selector =
        Selector::parse(SNIPPET_SELECTOR).map_err(|e| EvidenceError::Parse(e.to_string()))?;
    let document = Html::parse_document(html);

    Ok(document
        .select(&selector)
        .map(|element| collapse_whitespace(&element.text().collect::<Vec<_>>().join(" ")))
        .filter(|text| !text.is_empty())
        .take(limit)
        .map(|snippet| EvidenceItem::new(SCRAPED_TITLE, snippet, SCRAPED_SOURCE))
        .collect())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
