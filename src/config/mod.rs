//! Configuration module for staff-harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional; missing keys fall back to their defaults.
//!
//! # Example
//!
//! ```no_run
//! use staff_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Will visit at most {} pages", config.pagination.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, ExtractorConfig, FetcherConfig, OutputConfig, PaginationConfig,
    DEFAULT_NEXT_BUTTON_SELECTOR,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::{validate, validate_pagination_config};
