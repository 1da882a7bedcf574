// HTTP client for the Anthropic Messages API

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ChatMessage, ModelProvider, ProviderError, Queries};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const REQUEST_TIMEOUT_SECS: u64 = 60;

// Deterministic output for plan/draft/critique steps.
const TEMPERATURE: f32 = 0.0;

/// Anthropic implementation of [`ModelProvider`].
pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicProvider {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            max_tokens: 4096,
        })
    }

    /// Override the API endpoint (used by tests against a mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Send a single messages request and return the concatenated text blocks.
    async fn send(&self, messages: &[ChatMessage]) -> Result<String, ProviderError> {
        let request = self.to_wire_request(messages);
        tracing::debug!("Sending request to Anthropic API: {:?}", request);

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Api(format!("Request to Anthropic API failed: {e}")))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::RateLimited(format!("HTTP 429: {body}")));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // The API reports transient capacity problems as a 529 with an
            // overloaded_error body; treat those like a rate limit.
            if body.contains("overloaded_error") {
                return Err(ProviderError::RateLimited(format!(
                    "HTTP {status}: {body}"
                )));
            }
            return Err(ProviderError::Api(format!(
                "Anthropic API request failed with status {status}: {body}"
            )));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Api(format!("Failed to parse Anthropic response: {e}")))?;

        Ok(parsed.text())
    }

    /// Build the wire request, hoisting system messages into the `system`
    /// field (the Messages API rejects a `system` role inside `messages`).
    fn to_wire_request(&self, messages: &[ChatMessage]) -> MessagesRequest {
        let system: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == "system")
            .map(|m| m.content.as_str())
            .collect();

        let wire_messages: Vec<WireMessage> = messages
            .iter()
            .filter(|m| m.role != "system")
            .map(|m| WireMessage {
                role: m.role.clone(),
                content: m.content.clone(),
            })
            .collect();

        MessagesRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            messages: wire_messages,
            system: if system.is_empty() {
                None
            } else {
                Some(system.join("\n\n"))
            },
            temperature: TEMPERATURE,
        }
    }
}

#[async_trait::async_trait]
impl ModelProvider for AnthropicProvider {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, ProviderError> {
        self.send(messages).await
    }

    async fn generate_queries(&self, messages: &[ChatMessage]) -> Result<Queries, ProviderError> {
        let text = self.send(messages).await?;
        parse_queries(&text)
            .ok_or_else(|| ProviderError::Api(format!("Failed to parse queries from: {text}")))
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}

// ── Wire types ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
}

impl MessagesResponse {
    fn text(&self) -> String {
        self.content
            .iter()
            .map(|block| match block {
                ContentBlock::Text { text } => text.as_str(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ── Structured-query parsing ───────────────────────────────────────────────────

/// Parse the model's query-list response.
///
/// The model is asked for a bare JSON object, but may wrap it in markdown
/// code fences or surround it with prose. Strip fences first, then fall back
/// to scanning for the outermost `{...}`.
fn parse_queries(text: &str) -> Option<Queries> {
    let stripped = strip_markdown_fences(text.trim());

    if let Ok(queries) = serde_json::from_str::<Queries>(stripped) {
        return Some(queries);
    }

    let start = stripped.find('{')?;
    let end = stripped.rfind('}')?;
    serde_json::from_str::<Queries>(&stripped[start..=end]).ok()
}

/// Strip leading/trailing markdown code fences (```json ... ``` or ``` ... ```)
fn strip_markdown_fences(s: &str) -> &str {
    let s = s.trim();
    let s = if let Some(rest) = s.strip_prefix("```json") {
        rest
    } else if let Some(rest) = s.strip_prefix("```") {
        rest
    } else {
        s
    };
    if let Some(rest) = s.strip_suffix("```") {
        rest.trim()
    } else {
        s.trim()
    }
}
