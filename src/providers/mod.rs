// Model provider abstraction
//
// The workflow talks to the hosted model through the `ModelProvider` trait,
// so alternate providers can be substituted without touching the control
// loop. The only concrete implementation today is Anthropic.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod anthropic;

pub use anthropic::AnthropicProvider;

/// A single role-tagged chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Structured list of search queries produced by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Queries {
    pub queries: Vec<String>,
}

/// Errors from a model provider call.
///
/// The retry wrapper branches on the variant: `RateLimited` is retried with
/// backoff, everything else aborts the attempt sequence immediately.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Provider signalled a rate limit (HTTP 429 or an overloaded backend).
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Any other failure: transport error, non-success status, malformed body.
    #[error("{0}")]
    Api(String),
}

/// Trait for text-generation providers.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Generate free text from a conversation.
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, ProviderError>;

    /// Generate a structured list of search queries from a conversation.
    async fn generate_queries(&self, messages: &[ChatMessage]) -> Result<Queries, ProviderError>;

    /// Provider name for logging.
    fn name(&self) -> &str;
}
