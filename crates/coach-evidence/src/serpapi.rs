//! SerpApi (keyed Google search) source

use async_trait::async_trait;
use coach_core::EvidenceItem;
use serde::Deserialize;
use std::time::Duration;

use crate::source::{EvidenceError, EvidenceSource};

const DEFAULT_BASE_URL: &str = "https://serpapi.com";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    link: String,
}

/// Search through SerpApi's Google engine
#[derive(Debug)]
pub struct SerpApiSource {
    api_key: String,
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl SerpApiSource {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
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
impl EvidenceSource for SerpApiSource {
    fn name(&self) -> &str {
        "serpapi"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<EvidenceItem>, EvidenceError> {
        let num = limit.to_string();
        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("engine", "google"),
                ("q", query),
                ("api_key", self.api_key.as_str()),
                ("num", num.as_str()),
            ])
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

        let body: SearchResponse = response.json().await?;
        if let Some(error) = body.error {
            return Err(EvidenceError::Parse(error));
        }

        Ok(body
            .organic_results
            .into_iter()
            .take(limit)
            .map(|r| EvidenceItem::new(r.title, r.snippet, r.link))
            .collect())
    }
}
