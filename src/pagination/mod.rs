//! Multi-page directory traversal
//!
//! This module contains:
//! - URL pagination detection (numbered `?page=N` style links)
//! - The page-side scripts used to click "next" and detect new content
//! - `CrawlSession`, the handle owning one browser context
//! - `InteractivePaginator`, the click-through driver for everything else

mod interactive;
mod scripts;
mod session;
mod url_detector;

pub use interactive::{CrawlReport, InteractivePaginator, StopReason};
pub use scripts::{PaginationScripts, SIGNATURE_LENGTH};
pub use session::CrawlSession;
pub use url_detector::{detect_url_pagination, plan_pagination, PaginationPlan};
