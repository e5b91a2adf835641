//! Top-level harvesting entry points
//!
//! `StaffHarvester` ties the pieces together:
//! - `extract`: one page, classifier then pattern or semantic extraction
//! - `extract_many`: the same over many URLs concurrently
//! - `extract_with_pagination`: URL enumeration when the directory has
//!   numbered page links, click-through pagination otherwise

mod fan_out;

pub use fan_out::{fan_out, BatchReport};

use crate::config::{validate, validate_pagination_config, Config, PaginationConfig};
use crate::extract::{classify_content, extract_from_markup, SemanticAdapter};
use crate::fetch::{FetchOptions, HttpFetcher, PageFetcher};
use crate::llm::{OpenAiExtractor, SemanticExtractor};
use crate::model::{PageContent, StaffMember};
use crate::pagination::{plan_pagination, CrawlSession, InteractivePaginator, PaginationPlan};
use crate::Result;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Staff directory harvester
///
/// Cheap to clone; clones share the fetcher and extractor.
#[derive(Clone)]
pub struct StaffHarvester {
    fetcher: Arc<dyn PageFetcher>,
    semantic: SemanticAdapter,
    config: Arc<Config>,
}

impl StaffHarvester {
    /// Creates a harvester from explicit collaborators
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        extractor: Arc<dyn SemanticExtractor>,
        config: Config,
    ) -> Self {
        let semantic = SemanticAdapter::new(extractor, config.extractor.chunking());
        Self {
            fetcher,
            semantic,
            config: Arc::new(config),
        }
    }

    /// Creates a harvester with the HTTP fetcher and the OpenAI extractor
    ///
    /// # Arguments
    ///
    /// * `config` - Harvest configuration
    ///
    /// # Returns
    ///
    /// * `Ok(StaffHarvester)` - Ready to use
    /// * `Err(HarvestError::Config)` - Invalid configuration, or the API key
    ///   variable is unset. Nothing has touched the network at this point.
    pub fn from_config(config: Config) -> Result<Self> {
        validate(&config)?;
        let extractor = OpenAiExtractor::from_config(&config.extractor)?;
        let fetcher = HttpFetcher::new(&config.fetcher)?;
        tracing::debug!("Using model {}", extractor.model());
        Ok(Self::new(Arc::new(fetcher), Arc::new(extractor), config))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Extracts staff records from a single page
    ///
    /// The page is fetched once for analysis. Embedded content goes through
    /// the pattern rules first; if they find nothing, or the content is not
    /// embedded, the page is fetched again with boilerplate excluded and
    /// handed to the semantic extractor.
    ///
    /// # Errors
    ///
    /// * `HarvestError::Fetch` - Either fetch was unsuccessful
    /// * `HarvestError::Parse` - The semantic response was not valid JSON
    pub async fn extract(&self, url: &str) -> Result<Vec<StaffMember>> {
        let page = self
            .fetcher
            .fetch(url, &FetchOptions::analyze(&self.config.fetcher))
            .await?
            .into_result()?;

        let classification = classify_content(&page.html, page.markdown_or_empty());
        tracing::info!(
            "Detected {} content on {} ({} emails)",
            classification.kind,
            url,
            classification.email_count
        );

        if classification.kind.prefers_patterns() {
            let members = extract_from_markup(&page.html);
            if !members.is_empty() {
                tracing::info!(
                    "Pattern extraction found {} member(s) on {}",
                    members.len(),
                    url
                );
                return Ok(members);
            }
            tracing::info!("Pattern extraction found nothing on {}", url);
        }

        tracing::info!("Using semantic extraction for {}", url);
        let page = self
            .fetcher
            .fetch(url, &FetchOptions::extraction(&self.config.fetcher))
            .await?
            .into_result()?;
        self.semantic.extract(&page).await
    }

    /// Extracts every URL concurrently
    ///
    /// Failures are isolated per URL and listed in the report.
    pub async fn extract_many(&self, urls: &[String]) -> BatchReport {
        self.extract_all(urls.to_vec(), &CancellationToken::new())
            .await
    }

    /// Extracts a possibly multi-page directory
    ///
    /// Uses `pagination`, or the configured pagination settings when `None`.
    ///
    /// # Errors
    ///
    /// Only the first page is strict: an unsuccessful first fetch is a
    /// `HarvestError::Fetch`. Failures on later pages end the crawl with
    /// the records gathered so far.
    pub async fn extract_with_pagination(
        &self,
        url: &str,
        pagination: Option<PaginationConfig>,
    ) -> Result<Vec<StaffMember>> {
        self.extract_with_pagination_cancellable(url, pagination, CancellationToken::new())
            .await
    }

    /// Like `extract_with_pagination`, stopping early when `cancel` fires
    ///
    /// On cancellation the in-flight step is abandoned, the session is torn
    /// down and the records gathered so far are returned.
    pub async fn extract_with_pagination_cancellable(
        &self,
        url: &str,
        pagination: Option<PaginationConfig>,
        cancel: CancellationToken,
    ) -> Result<Vec<StaffMember>> {
        let pagination = pagination.unwrap_or_else(|| self.config.pagination.clone());
        validate_pagination_config(&pagination)?;
        let base_url = Url::parse(url)?;

        let session = CrawlSession::open(Arc::clone(&self.fetcher));
        tracing::info!("Page 1: loading {}", url);

        let loaded = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = session.load(url, FetchOptions::extraction(&self.config.fetcher)) => Some(result),
        };
        let first_page = match loaded.map(|result| result.and_then(PageContent::into_result)) {
            Some(Ok(page)) => page,
            Some(Err(e)) => {
                session.close().await;
                return Err(e);
            }
            None => {
                session.close().await;
                tracing::info!("Pagination of {} cancelled before the first page", url);
                return Ok(Vec::new());
            }
        };

        match plan_pagination(&first_page.html, &base_url, pagination.max_pages) {
            PaginationPlan::UrlSequence(urls) => {
                session.close().await;
                tracing::info!(
                    "Detected URL pagination on {}, extracting {} page(s)",
                    url,
                    urls.len()
                );

                let urls: Vec<String> = urls.into_iter().map(String::from).collect();
                let total = urls.len();
                let report = self.extract_all(urls, &cancel).await;
                tracing::info!(
                    "Total: {} member(s) from {} of {} page(s)",
                    report.members.len(),
                    report.succeeded(total),
                    total
                );
                Ok(report.members)
            }
            PaginationPlan::Interactive => {
                let paginator = InteractivePaginator::new(
                    session,
                    self.semantic.clone(),
                    pagination,
                    self.config.fetcher.clone(),
                );
                let report = paginator.run(url, first_page, &cancel).await;
                Ok(report.into_members())
            }
        }
    }

    async fn extract_all(&self, urls: Vec<String>, cancel: &CancellationToken) -> BatchReport {
        let concurrency = self.config.fetcher.max_concurrent_fetches;
        fan_out(urls, concurrency, cancel, |url| {
            let harvester = self.clone();
            async move { harvester.extract(&url).await }
        })
        .await
    }
}
