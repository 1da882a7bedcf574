// HTTP client for the Tavily search API

use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use super::{SearchProvider, Snippet};

const DEFAULT_BASE_URL: &str = "https://api.tavily.com";
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Tavily implementation of [`SearchProvider`].
pub struct TavilyClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl TavilyClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Override the API endpoint (used by tests against a mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait::async_trait]
impl SearchProvider for TavilyClient {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Snippet>> {
        tracing::debug!("Searching Tavily: {:?} (max {})", query, max_results);

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .header("content-type", "application/json")
            .json(&json!({
                "query": query,
                "api_key": self.api_key,
                "max_results": max_results,
            }))
            .send()
            .await
            .context("Failed to send request to Tavily API")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Tavily search failed with status {status}: {body}");
        }

        let body: TavilyResponse = response
            .json()
            .await
            .context("Failed to parse Tavily response")?;

        Ok(body
            .results
            .into_iter()
            .map(|result| Snippet {
                title: result.title,
                url: result.url,
                content: result.content,
            })
            .collect())
    }

    fn name(&self) -> &str {
        "tavily"
    }
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}
