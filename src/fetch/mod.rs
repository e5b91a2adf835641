//! Page fetching
//!
//! This module contains:
//! - The `PageFetcher` contract and its `FetchOptions`
//! - `HttpFetcher`, a stateless reqwest-backed implementation
//! - The markdown rendering used for the cleaned-text view of a page

mod http;
mod markdown;
mod traits;

pub use http::{build_http_client, HttpFetcher, BROWSER_REQUIRED};
pub use markdown::render_markdown;
pub use traits::{FetchOptions, PageFetcher};
