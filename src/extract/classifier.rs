//! Content classification
//!
//! Decides per page whether contact data is better harvested by pattern
//! matching over raw markup or by the semantic extractor, based on how many
//! distinct email addresses survive the markdown rendering.

use crate::model::EMAIL_PATTERN;
use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(EMAIL_PATTERN).unwrap());

/// Markup must hold more than this many distinct emails to count as embedded
const EMBEDDED_MIN_HTML_EMAILS: usize = 10;

/// Markup/markdown ratio that must be exceeded to count as embedded
const EMBEDDED_RATIO: usize = 3;

/// Markdown must hold more than this many distinct emails to count as visible
const VISIBLE_MIN_MD_EMAILS: usize = 5;

/// Where a page's contact data lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    /// Present in markup but sparse in cleaned text (ARIA labels, inline JSON)
    Embedded,
    /// Present in cleaned text
    Visible,
    /// Neither heuristic fires
    Semantic,
}

impl ContentKind {
    /// Returns true if the pattern extractor should be tried first
    pub fn prefers_patterns(&self) -> bool {
        matches!(self, Self::Embedded)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Embedded => "embedded",
            Self::Visible => "visible",
            Self::Semantic => "semantic",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classification outcome with the email count that drove it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentClassification {
    pub kind: ContentKind,
    pub email_count: usize,
}

/// Counts distinct email-like substrings
pub fn count_distinct_emails(text: &str) -> usize {
    EMAIL_RE
        .find_iter(text)
        .map(|m| m.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// Classifies a page from its raw markup and cleaned text
///
/// Rules, in order:
/// 1. more than 10 distinct emails in markup and more than 3x the markdown count → `Embedded`
/// 2. more than 5 distinct emails in markdown → `Visible`
/// 3. otherwise → `Semantic`
pub fn classify_content(html: &str, markdown: &str) -> ContentClassification {
    let emails_html = count_distinct_emails(html);
    let emails_md = if markdown.is_empty() {
        0
    } else {
        count_distinct_emails(markdown)
    };

    classify_counts(emails_html, emails_md)
}

/// Applies the decision rule to precomputed counts
pub fn classify_counts(emails_html: usize, emails_md: usize) -> ContentClassification {
    if emails_html > EMBEDDED_MIN_HTML_EMAILS && emails_html > emails_md * EMBEDDED_RATIO {
        ContentClassification {
            kind: ContentKind::Embedded,
            email_count: emails_html,
        }
    } else if emails_md > VISIBLE_MIN_MD_EMAILS {
        ContentClassification {
            kind: ContentKind::Visible,
            email_count: emails_md,
        }
    } else {
        ContentClassification {
            kind: ContentKind::Semantic,
            email_count: emails_html.max(emails_md),
        }
    }
}
