// Configuration structs

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
pub const DEFAULT_RESULTS_PER_QUERY: usize = 2;

#[derive(Debug, Clone)]
pub struct Config {
    /// API key for the Anthropic Messages API
    pub anthropic_api_key: String,

    /// API key for the Tavily search API
    pub tavily_api_key: String,

    /// Model identifier sent with every generation request
    pub model: String,

    /// Generation cap per model call
    pub max_tokens: u32,

    /// Search-result limit applied to each research query
    pub results_per_query: usize,
}

impl Config {
    /// Config with default knobs for the given API keys.
    pub fn new(anthropic_api_key: impl Into<String>, tavily_api_key: impl Into<String>) -> Self {
        Self {
            anthropic_api_key: anthropic_api_key.into(),
            tavily_api_key: tavily_api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            results_per_query: DEFAULT_RESULTS_PER_QUERY,
        }
    }
}
