use crate::model::StaffMember;
use crate::{HarvestError, Result};

/// Immutable snapshot of one fetch, as reported by the page fetcher
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageContent {
    /// URL the snapshot was taken from
    pub url: String,

    /// Raw markup
    pub html: String,

    /// Cleaned markdown rendering, if the fetcher produced one
    pub markdown: Option<String>,

    /// Whether the fetcher reports success
    pub success: bool,

    /// Failure detail reported by the fetcher
    pub error: Option<String>,
}

impl PageContent {
    /// A successful snapshot
    pub fn ok(url: impl Into<String>, html: impl Into<String>, markdown: Option<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
            markdown,
            success: true,
            error: None,
        }
    }

    /// An unsuccessful snapshot carrying the fetcher's error detail
    pub fn failed(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Markdown rendering, or an empty string when absent
    pub fn markdown_or_empty(&self) -> &str {
        self.markdown.as_deref().unwrap_or("")
    }

    /// Best text to hand to the semantic extractor: markdown, else markup
    pub fn semantic_input(&self) -> &str {
        match self.markdown.as_deref() {
            Some(md) if !md.trim().is_empty() => md,
            _ => &self.html,
        }
    }

    /// Converts an unsuccessful snapshot into a `FetchError`
    pub fn into_result(self) -> Result<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(HarvestError::Fetch {
                message: self
                    .error
                    .unwrap_or_else(|| "fetcher reported failure".to_string()),
                url: self.url,
            })
        }
    }
}

/// Records harvested from one page of a crawl
#[derive(Debug, Clone, PartialEq)]
pub struct PageRecords {
    /// 1-based page index in fetch order
    pub page_index: usize,

    /// Records in the order they were found on the page
    pub members: Vec<StaffMember>,
}

/// Concatenates per-page results in fetch order
pub fn merge_pages(pages: Vec<PageRecords>) -> Vec<StaffMember> {
    let mut pages = pages;
    pages.sort_by_key(|p| p.page_index);
    pages.into_iter().flat_map(|p| p.members).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(name: &str) -> StaffMember {
        StaffMember::new(name, None, None).unwrap()
    }

    #[test]
    fn test_into_result_failure() {
        let page = PageContent::failed("https://example.com/", "timeout");
        let err = page.into_result().unwrap_err();
        assert!(matches!(err, HarvestError::Fetch { .. }));
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn test_semantic_input_prefers_markdown() {
        let page = PageContent::ok("u", "<p>html</p>", Some("md".to_string()));
        assert_eq!(page.semantic_input(), "md");

        let page = PageContent::ok("u", "<p>html</p>", Some("   ".to_string()));
        assert_eq!(page.semantic_input(), "<p>html</p>");
    }

    #[test]
    fn test_merge_pages_uses_page_order() {
        let pages = vec![
            PageRecords {
                page_index: 2,
                members: vec![member("Bea Two")],
            },
            PageRecords {
                page_index: 1,
                members: vec![member("Al One"), member("Amy One")],
            },
        ];
        let names: Vec<_> = merge_pages(pages).into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["Al One", "Amy One", "Bea Two"]);
    }
}
