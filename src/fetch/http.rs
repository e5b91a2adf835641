//! Stateless HTTP implementation of the fetcher contract
//!
//! Suitable for server-rendered directories. It cannot execute page-side
//! scripts, so session steps come back as unsuccessful snapshots and the
//! interactive paginator stops after the first page.

use crate::config::FetcherConfig;
use crate::fetch::markdown::render_markdown;
use crate::fetch::{FetchOptions, PageFetcher};
use crate::model::PageContent;
use crate::Result;
use async_trait::async_trait;
use reqwest::{header, Client};
use std::time::Duration;

/// Detail reported for fetches that need a scripted browser
pub const BROWSER_REQUIRED: &str = "page-side scripts require a scripted browser backend";

/// Fetcher backed by a plain HTTP client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

/// Builds an HTTP client with the configured user agent and timeout
///
/// # Example
///
/// ```no_run
/// use staff_harvest::config::FetcherConfig;
/// use staff_harvest::fetch::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.request_timeout))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

impl HttpFetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    /// Wraps an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<PageContent> {
        if options.needs_browser() {
            return Ok(PageContent::failed(url, BROWSER_REQUIRED));
        }

        let mut request = self.client.get(url);
        if options.bypass_cache {
            request = request.header(header::CACHE_CONTROL, "no-cache");
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let detail = if e.is_timeout() {
                    "Request timeout".to_string()
                } else if e.is_connect() {
                    "Connection refused".to_string()
                } else {
                    e.to_string()
                };
                return Ok(PageContent::failed(url, detail));
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Ok(PageContent::failed(url, format!("HTTP {}", status.as_u16())));
        }

        let html = match response.text().await {
            Ok(body) => body,
            Err(e) => return Ok(PageContent::failed(url, e.to_string())),
        };

        let rendered = render_markdown(&html, &options.excluded_tags);
        let markdown = (rendered.split_whitespace().count() >= options.word_count_threshold)
            .then_some(rendered);

        tracing::debug!(
            "Fetched {} ({} bytes, markdown: {})",
            url,
            html.len(),
            markdown.is_some()
        );

        Ok(PageContent::ok(url, html, markdown))
    }

    async fn kill_session(&self, _session_id: &str) -> Result<()> {
        Ok(())
    }
}
