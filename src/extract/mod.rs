//! Extraction module for turning page content into staff records
//!
//! This module contains:
//! - Content classification (pattern matching vs. semantic extraction)
//! - Rule-based pattern extraction over raw markup
//! - The adapter around the external semantic extractor

mod classifier;
mod patterns;
mod semantic;

pub use classifier::{
    classify_content, classify_counts, count_distinct_emails, ContentClassification, ContentKind,
};
pub use patterns::{extract_from_markup, is_generic_mailbox};
pub use semantic::{
    parse_extracted_content, SemanticAdapter, SemanticResponse, EXTRACTION_INSTRUCTION,
};

/// How records are pulled out of a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// Deterministic rules over raw markup
    Pattern,
    /// The external semantic extractor
    Semantic,
}

impl ExtractionStrategy {
    /// Picks the strategy for a classified page
    pub fn for_classification(classification: &ContentClassification) -> Self {
        if classification.kind.prefers_patterns() {
            Self::Pattern
        } else {
            Self::Semantic
        }
    }
}
