//! Staff-Harvest: staff directory extraction without per-site scrapers
//!
//! This crate pulls `name, role, email` records out of organizational web
//! pages. Each page is classified to pick between deterministic pattern
//! rules and a semantic (LLM) extractor, and multi-page directories are
//! walked either by enumerating numbered page URLs or by clicking through
//! a single browser session.

pub mod config;
pub mod extract;
pub mod fetch;
pub mod harvester;
pub mod llm;
pub mod model;
pub mod output;
pub mod pagination;

use thiserror::Error;

/// Main error type for Staff-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Failed to parse extractor response: {0}")]
    Parse(String),

    /// A scripted step inside a crawl session failed
    #[error("Page interaction failed on {url}: {message}")]
    Interaction { url: String, message: String },

    #[error("Semantic extractor error: {0}")]
    Llm(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Missing credential: environment variable {0} is not set")]
    MissingCredential(String),
}

/// Result type alias for Staff-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, PaginationConfig};
pub use harvester::{BatchReport, StaffHarvester};
pub use model::{PageContent, StaffMember};
pub use output::{read_csv, to_csv};
