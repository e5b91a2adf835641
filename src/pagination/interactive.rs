//! Step-by-step pagination through one live session
//!
//! Used when a directory has no enumerable page URLs. The driver extracts
//! the current page, clicks "next", waits for the content to change and
//! repeats until one of the stop conditions fires:
//!
//! - no next-page control, or the content never changed
//! - a page after the first yields no records
//! - a page only repeats emails already collected
//! - the page limit is reached
//! - a step fails or the run is cancelled
//!
//! Whatever was collected up to that point is returned. The session is
//! closed on every exit path.

use crate::config::{FetcherConfig, PaginationConfig};
use crate::extract::{classify_content, extract_from_markup, ExtractionStrategy, SemanticAdapter};
use crate::fetch::FetchOptions;
use crate::model::{merge_pages, PageContent, PageRecords, StaffMember};
use crate::pagination::scripts::PaginationScripts;
use crate::pagination::session::CrawlSession;
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Slack on top of the page-side wait for the click and snapshot itself
const STEP_GRACE: Duration = Duration::from_secs(10);

/// Why an interactive run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// No next-page control was activated, or the content did not change in time
    NoNextPage { detail: Option<String> },

    /// A page after the first had no records
    EmptyPage,

    /// A page only repeated emails already collected
    DuplicateContent,

    /// The configured page limit was reached
    MaxPages,

    /// A step failed; pages gathered before it are kept
    Error(String),

    /// The caller cancelled the run
    Cancelled,
}

impl StopReason {
    /// Returns true if the run ended because something went wrong
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoNextPage { detail: Some(detail) } => write!(f, "no next page ({})", detail),
            Self::NoNextPage { detail: None } => write!(f, "no next page"),
            Self::EmptyPage => write!(f, "no new members, probably the last page"),
            Self::DuplicateContent => write!(f, "duplicate content detected"),
            Self::MaxPages => write!(f, "page limit reached"),
            Self::Error(e) => write!(f, "error: {}", e),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Outcome of an interactive run
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlReport {
    /// Accepted pages in fetch order
    pub pages: Vec<PageRecords>,

    pub stop_reason: StopReason,
}

impl CrawlReport {
    pub fn pages_visited(&self) -> usize {
        self.pages.len()
    }

    /// All accepted records, concatenated in page order
    pub fn into_members(self) -> Vec<StaffMember> {
        merge_pages(self.pages)
    }
}

enum CrawlState {
    Extracting { page: usize, content: PageContent },
    Advancing { page: usize },
    Done(StopReason),
}

/// Pages accepted so far and the emails they carry
#[derive(Default)]
struct Collected {
    pages: Vec<PageRecords>,
    seen_emails: HashSet<String>,
}

impl Collected {
    /// Accepts the records of `page`, or says why the run must stop
    ///
    /// The first page is always accepted. Later pages are rejected when
    /// empty, or when every email they carry has been seen before. Pages
    /// whose records have no emails never trip the duplicate check.
    fn admit(&mut self, page: usize, members: Vec<StaffMember>) -> Result<(), StopReason> {
        if page > 1 {
            if members.is_empty() {
                return Err(StopReason::EmptyPage);
            }
            let emails: HashSet<&str> = members.iter().filter_map(|m| m.identity()).collect();
            if !emails.is_empty() && emails.iter().all(|e| self.seen_emails.contains(*e)) {
                return Err(StopReason::DuplicateContent);
            }
        }

        self.seen_emails
            .extend(members.iter().filter_map(|m| m.identity()).map(str::to_string));
        self.pages.push(PageRecords {
            page_index: page,
            members,
        });
        Ok(())
    }
}

/// Driver for one interactive pagination run
pub struct InteractivePaginator {
    session: CrawlSession,
    semantic: SemanticAdapter,
    pagination: PaginationConfig,
    fetcher: FetcherConfig,
    scripts: PaginationScripts,
}

impl InteractivePaginator {
    /// Takes ownership of `session` for the duration of the run
    pub fn new(
        session: CrawlSession,
        semantic: SemanticAdapter,
        pagination: PaginationConfig,
        fetcher: FetcherConfig,
    ) -> Self {
        let scripts = PaginationScripts::new(&pagination);
        Self {
            session,
            semantic,
            pagination,
            fetcher,
            scripts,
        }
    }

    /// Walks the directory starting from an already loaded first page
    ///
    /// # Arguments
    ///
    /// * `start_url` - URL the session was opened on
    /// * `first_page` - Snapshot of that URL taken through the session
    /// * `cancel` - Abandons the in-flight step when triggered
    ///
    /// # Returns
    ///
    /// The accepted pages and the reason the run stopped. Never fails:
    /// step errors end the run with the pages gathered so far.
    pub async fn run(
        self,
        start_url: &str,
        first_page: PageContent,
        cancel: &CancellationToken,
    ) -> CrawlReport {
        // The strategy is fixed by the first page for the whole run
        let classification =
            classify_content(&first_page.html, first_page.markdown_or_empty());
        let strategy = ExtractionStrategy::for_classification(&classification);
        tracing::info!(
            "Interactive pagination on {}: {} content ({} emails), using {:?} extraction",
            start_url,
            classification.kind,
            classification.email_count,
            strategy
        );

        let mut collected = Collected::default();
        let mut state = CrawlState::Extracting {
            page: 1,
            content: first_page,
        };

        let stop_reason = loop {
            state = match state {
                CrawlState::Extracting { page, content } => {
                    match self.extract_page(strategy, &content, cancel).await {
                        None => CrawlState::Done(StopReason::Cancelled),
                        Some(members) => {
                            let found = members.len();
                            match collected.admit(page, members) {
                                Err(reason) => {
                                    tracing::info!("Page {}: stopping, {}", page, reason);
                                    CrawlState::Done(reason)
                                }
                                Ok(()) => {
                                    tracing::info!("Page {}: found {} member(s)", page, found);
                                    if page >= self.pagination.max_pages {
                                        CrawlState::Done(StopReason::MaxPages)
                                    } else {
                                        CrawlState::Advancing { page }
                                    }
                                }
                            }
                        }
                    }
                }
                CrawlState::Advancing { page } => {
                    tracing::debug!("Page {}: navigating to next page", page + 1);
                    match self.advance(start_url, cancel).await {
                        Ok(content) => CrawlState::Extracting {
                            page: page + 1,
                            content,
                        },
                        Err(reason) => CrawlState::Done(reason),
                    }
                }
                CrawlState::Done(reason) => break reason,
            };
        };

        self.session.close().await;

        let report = CrawlReport {
            pages: collected.pages,
            stop_reason,
        };
        let total: usize = report.pages.iter().map(|p| p.members.len()).sum();
        if report.stop_reason.is_error() {
            tracing::warn!(
                "Pagination of {} ended early ({}); keeping {} member(s) from {} page(s)",
                start_url,
                report.stop_reason,
                total,
                report.pages_visited()
            );
        } else {
            tracing::info!(
                "Pagination of {} finished ({}): {} member(s) from {} page(s)",
                start_url,
                report.stop_reason,
                total,
                report.pages_visited()
            );
        }
        report
    }

    /// Applies the run's strategy to one page; `None` if cancelled
    async fn extract_page(
        &self,
        strategy: ExtractionStrategy,
        content: &PageContent,
        cancel: &CancellationToken,
    ) -> Option<Vec<StaffMember>> {
        if cancel.is_cancelled() {
            return None;
        }

        match strategy {
            ExtractionStrategy::Pattern => Some(extract_from_markup(&content.html)),
            ExtractionStrategy::Semantic => tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                members = self.semantic.extract_best_effort(content) => Some(members),
            },
        }
    }

    /// Clicks "next" and waits for the content to change
    async fn advance(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<PageContent, StopReason> {
        let wait = self.pagination.wait_duration();
        let options = FetchOptions::extraction(&self.fetcher)
            .script_only(self.scripts.click_next.clone())
            .wait_for(self.scripts.wait_for_change.clone(), wait);

        let step = tokio::time::timeout(wait + STEP_GRACE, self.session.step(url, options));
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(StopReason::Cancelled),
            outcome = step => outcome,
        };

        match outcome {
            Err(_) => Err(StopReason::NoNextPage {
                detail: Some("timed out waiting for new content".to_string()),
            }),
            Ok(Err(e)) => Err(StopReason::Error(e.to_string())),
            Ok(Ok(content)) if !content.success => {
                Err(StopReason::NoNextPage { detail: content.error })
            }
            Ok(Ok(content)) => Ok(content),
        }
    }
}
