//! Browser session handle for interactive pagination

use crate::fetch::{FetchOptions, PageFetcher};
use crate::model::PageContent;
use crate::{HarvestError, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

/// One browser context, exclusively owned by a single paginated run
///
/// Every fetch made through the handle is bound to the same session id.
/// `close` consumes the handle, so a torn-down session cannot be reused.
/// If the handle is dropped without `close` (cancellation, panic), the
/// teardown is spawned onto the current runtime.
pub struct CrawlSession {
    id: String,
    fetcher: Arc<dyn PageFetcher>,
    closed: bool,
}

impl CrawlSession {
    /// Opens a session with a fresh, process-unique id
    pub fn open(fetcher: Arc<dyn PageFetcher>) -> Self {
        let id = format!(
            "staff_pagination_{}_{}",
            std::process::id(),
            NEXT_SESSION.fetch_add(1, Ordering::Relaxed)
        );
        tracing::debug!("Opened crawl session {}", id);
        Self {
            id,
            fetcher,
            closed: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Navigates the session to `url`
    pub async fn load(&self, url: &str, options: FetchOptions) -> Result<PageContent> {
        let options = options.in_session(self.id.clone());
        self.fetcher.fetch(url, &options).await
    }

    /// Runs a script step against the session's current page
    ///
    /// A fetcher failure during the step is reported as
    /// `HarvestError::Interaction` on `url`.
    pub async fn step(&self, url: &str, options: FetchOptions) -> Result<PageContent> {
        let mut options = options.in_session(self.id.clone());
        options.js_only = true;
        self.fetcher
            .fetch(url, &options)
            .await
            .map_err(|e| match e {
                HarvestError::Interaction { .. } => e,
                other => HarvestError::Interaction {
                    url: url.to_string(),
                    message: other.to_string(),
                },
            })
    }

    /// Tears the session down; failures are logged and discarded
    pub async fn close(mut self) {
        self.closed = true;
        if let Err(e) = self.fetcher.kill_session(&self.id).await {
            tracing::debug!("Ignoring teardown failure for session {}: {}", self.id, e);
        }
        tracing::debug!("Closed crawl session {}", self.id);
    }
}

impl Drop for CrawlSession {
    fn drop(&mut self) {
        if self.closed {
            return;
        }

        tracing::debug!("Session {} dropped without close, tearing down", self.id);
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let fetcher = Arc::clone(&self.fetcher);
            let id = std::mem::take(&mut self.id);
            handle.spawn(async move {
                let _ = fetcher.kill_session(&id).await;
            });
        }
    }
}
