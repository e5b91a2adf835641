use crate::llm::ChunkingConfig;
use serde::Deserialize;
use std::time::Duration;

/// Default "next page" selector idioms, tried in order
pub const DEFAULT_NEXT_BUTTON_SELECTOR: &str = "[aria-label='Next Page'], li.next a, a:has-text('Next'), a:has-text('next'), a:has-text('Siguiente'), a.next, .next a, [rel='next'], a[aria-label*='next'], a[aria-label*='Next'], .pagination a:last-child, .cms-pagination a:last-child";

/// Main configuration structure for staff-harvest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Multi-page crawl configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Comma-separated selector alternatives for the "next page" control
    #[serde(rename = "next-button-selector")]
    pub next_button_selector: String,

    /// Maximum number of pages to visit
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// How long to wait for new content after a "next" click (milliseconds)
    #[serde(rename = "wait-timeout")]
    pub wait_timeout: u64,

    /// Selector of the region whose text signature detects a page change
    #[serde(rename = "content-selector")]
    pub content_selector: String,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            next_button_selector: DEFAULT_NEXT_BUTTON_SELECTOR.to_string(),
            max_pages: 10,
            wait_timeout: 5000,
            content_selector: "body".to_string(),
        }
    }
}

impl PaginationConfig {
    /// The selector alternatives in priority order
    pub fn selectors(&self) -> Vec<&str> {
        self.next_button_selector
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn wait_duration(&self) -> Duration {
        Duration::from_millis(self.wait_timeout)
    }
}

/// Page fetcher configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Pages with fewer words than this get no markdown rendering
    #[serde(rename = "word-count-threshold")]
    pub word_count_threshold: usize,

    /// Tags dropped from the markdown rendering
    #[serde(rename = "excluded-tags")]
    pub excluded_tags: Vec<String>,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout")]
    pub request_timeout: u64,

    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Upper bound on simultaneous fetches during fan-out
    #[serde(rename = "max-concurrent-fetches")]
    pub max_concurrent_fetches: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            word_count_threshold: 10,
            excluded_tags: ["script", "style", "nav", "footer", "aside"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            request_timeout: 30,
            user_agent: format!("staff-harvest/{}", env!("CARGO_PKG_VERSION")),
            max_concurrent_fetches: 8,
        }
    }
}

/// Semantic extractor configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// "vendor/model" identifier
    pub provider: String,

    /// Environment variable holding the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Chunk size in tokens
    #[serde(rename = "chunk-token-threshold")]
    pub chunk_token_threshold: usize,

    /// Fraction of each chunk repeated in the next one
    #[serde(rename = "overlap-rate")]
    pub overlap_rate: f64,

    pub temperature: f32,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            provider: "openai/gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            chunk_token_threshold: 1500,
            overlap_rate: 0.1,
            temperature: 0.0,
        }
    }
}

impl ExtractorConfig {
    /// Model name with any "vendor/" prefix removed
    pub fn model_name(&self) -> &str {
        self.provider
            .split_once('/')
            .map(|(_, model)| model)
            .unwrap_or(&self.provider)
    }

    pub fn chunking(&self) -> ChunkingConfig {
        ChunkingConfig {
            threshold: self.chunk_token_threshold,
            overlap_rate: self.overlap_rate,
        }
    }
}

/// CSV output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory CSV files are written to
    #[serde(rename = "output-dir")]
    pub output_dir: String,

    /// Prefix of generated file names
    #[serde(rename = "filename-prefix")]
    pub filename_prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: "results".to_string(),
            filename_prefix: "staff".to_string(),
        }
    }
}
