//! Page fetcher contract
//!
//! The fetcher navigates, renders and runs page-side scripts. The crate
//! only sees the resulting snapshot, so anything that manipulates a live
//! page (clicking "next", waiting for new content) is expressed as script
//! options on a fetch bound to a session.

use crate::config::FetcherConfig;
use crate::model::PageContent;
use crate::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Options for a single fetch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchOptions {
    /// Skip any fetcher-side cache
    pub bypass_cache: bool,

    /// Pages with fewer words than this get no markdown rendering
    pub word_count_threshold: usize,

    /// Tags dropped from the markdown rendering
    pub excluded_tags: Vec<String>,

    /// Script to run against the page before the snapshot is taken
    pub js_code: Option<String>,

    /// Predicate script polled until it returns true
    pub wait_for: Option<String>,

    /// Upper bound on the `wait_for` polling
    pub wait_timeout: Option<Duration>,

    /// Browser context to bind to or reuse
    pub session_id: Option<String>,

    /// Do not navigate, only run `js_code` against the session's current page
    pub js_only: bool,
}

impl FetchOptions {
    /// One-shot fetch used to analyse a page: no tag exclusions
    pub fn analyze(config: &FetcherConfig) -> Self {
        Self {
            bypass_cache: true,
            word_count_threshold: config.word_count_threshold,
            ..Self::default()
        }
    }

    /// Fetch whose rendering feeds extraction: boilerplate tags excluded
    pub fn extraction(config: &FetcherConfig) -> Self {
        Self {
            excluded_tags: config.excluded_tags.clone(),
            ..Self::analyze(config)
        }
    }

    /// Binds the fetch to a browser session
    pub fn in_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Runs `script` against the current session page without navigating
    pub fn script_only(mut self, script: impl Into<String>) -> Self {
        self.js_code = Some(script.into());
        self.js_only = true;
        self
    }

    /// Waits until `predicate` holds or `timeout` elapses
    pub fn wait_for(mut self, predicate: impl Into<String>, timeout: Duration) -> Self {
        self.wait_for = Some(predicate.into());
        self.wait_timeout = Some(timeout);
        self
    }

    /// Returns true if the fetch needs a scripted browser
    pub fn needs_browser(&self) -> bool {
        self.js_only || self.js_code.is_some() || self.wait_for.is_some()
    }
}

/// Fetches pages, optionally inside a persistent browser session
///
/// An `Ok` snapshot with `success == false` is a failure the fetcher
/// reported (HTTP error, wait timeout, script returned false). `Err` is
/// reserved for the fetcher itself breaking down.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url`, or steps the bound session when `options.js_only` is set
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<PageContent>;

    /// Releases a browser session
    async fn kill_session(&self, session_id: &str) -> Result<()>;
}
