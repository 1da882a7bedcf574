// Web search abstraction
//
// Research steps issue model-produced queries through the `SearchProvider`
// trait and append the returned snippets to session content. Search calls
// are deliberately unprotected: a failure propagates and aborts the run.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod tavily;

pub use tavily::TavilyClient;

/// A single web-search result snippet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snippet {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub content: String,
}

/// Trait for web-search providers.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Search the web, returning at most `max_results` snippets.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Snippet>>;

    /// Provider name for logging.
    fn name(&self) -> &str;
}
