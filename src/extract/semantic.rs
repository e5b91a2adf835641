//! Semantic extraction adapter
//!
//! Builds the fixed contract handed to the external semantic extractor and
//! normalizes the response shapes it may return into `StaffMember` records.

use crate::llm::{ChunkingConfig, SemanticExtractor};
use crate::model::{PageContent, StaffDirectory, StaffMember};
use crate::{HarvestError, Result};
use serde_json::Value;
use std::sync::Arc;

/// Directive sent with every extraction request
pub const EXTRACTION_INSTRUCTION: &str = r#"
Extract ALL staff members from this page.

CRITICAL RULES:
1. ONLY extract REAL names that actually appear in the content
2. NEVER invent, generate, or fabricate any data
3. If you cannot find real staff data, return an empty list
4. Look for patterns like: "mailto:email" links, "Name, Title" patterns
5. Names often appear near email addresses or job titles

For each REAL person found, extract:
- name: The exact full name as shown (e.g., "Ms. Lauren Rider", "John Smith")
- role: Their job title (Teacher, Principal, Secretary, Counselor, etc.)
- email: Their email if visible (from mailto: links or text)

Common patterns to look for:
- [Name](mailto:email), Role
- Name | Role | email@domain
- Name - Role - email

If no staff members are found, return: {"staff_members": []}
DO NOT make up placeholder names like "John Doe" or "Jane Smith".
"#;

const STAFF_MEMBERS_KEY: &str = "staff_members";

/// The response shapes the semantic extractor is known to produce
#[derive(Debug, Clone, PartialEq)]
pub enum SemanticResponse {
    /// `{"staff_members": [...]}`
    Directory(Vec<Value>),

    /// `[{"staff_members": [...]}, ...]`, one mapping per processed chunk
    Blocks(Vec<Vec<Value>>),

    /// `[{"name": ..., "role": ..., "email": ...}, ...]`
    Members(Vec<Value>),
}

impl SemanticResponse {
    /// Parses a raw JSON response into one of the known shapes
    ///
    /// An empty response is an empty directory. Anything that is not JSON,
    /// or whose top level is neither a mapping nor a sequence, is a
    /// `ParseError`.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::Directory(Vec::new()));
        }

        let value: Value = serde_json::from_str(raw)
            .map_err(|e| HarvestError::Parse(format!("invalid JSON from extractor: {}", e)))?;

        match value {
            Value::Object(mut map) => match map.remove(STAFF_MEMBERS_KEY) {
                Some(Value::Array(items)) => Ok(Self::Directory(items)),
                Some(Value::Null) | None => Ok(Self::Directory(Vec::new())),
                Some(other) => Err(HarvestError::Parse(format!(
                    "expected a list under \"{}\", got {}",
                    STAFF_MEMBERS_KEY,
                    json_kind(&other)
                ))),
            },
            Value::Array(items) => {
                if items.first().is_some_and(is_directory_block) {
                    let blocks = items
                        .into_iter()
                        .filter_map(|block| match block {
                            Value::Object(mut map) => match map.remove(STAFF_MEMBERS_KEY) {
                                Some(Value::Array(members)) => Some(members),
                                _ => None,
                            },
                            _ => None,
                        })
                        .collect();
                    Ok(Self::Blocks(blocks))
                } else {
                    Ok(Self::Members(items))
                }
            }
            other => Err(HarvestError::Parse(format!(
                "expected a mapping or a list, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Flattens the response into validated records, preserving order
    ///
    /// Entries that are not member objects, or whose name fails validation,
    /// are dropped. An unusable email is cleared rather than dropping the
    /// person.
    pub fn into_members(self) -> Vec<StaffMember> {
        let raw = match self {
            Self::Directory(items) | Self::Members(items) => items,
            Self::Blocks(blocks) => blocks.into_iter().flatten().collect(),
        };

        raw.into_iter()
            .filter_map(|item| match serde_json::from_value::<StaffMember>(item) {
                Ok(member) => {
                    let name = member.name.clone();
                    let validated = member.validated();
                    if validated.is_none() {
                        tracing::debug!("Dropping invalid extracted member '{}'", name);
                    }
                    validated
                }
                Err(e) => {
                    tracing::debug!("Dropping malformed extracted member: {}", e);
                    None
                }
            })
            .collect()
    }
}

fn is_directory_block(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|map| map.contains_key(STAFF_MEMBERS_KEY))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

/// Parses a raw extractor response into records
pub fn parse_extracted_content(raw: &str) -> Result<Vec<StaffMember>> {
    Ok(SemanticResponse::parse(raw)?.into_members())
}

/// Adapter between pages and the external semantic extractor
#[derive(Clone)]
pub struct SemanticAdapter {
    extractor: Arc<dyn SemanticExtractor>,
    schema: Value,
    chunking: ChunkingConfig,
}

impl SemanticAdapter {
    pub fn new(extractor: Arc<dyn SemanticExtractor>, chunking: ChunkingConfig) -> Self {
        Self {
            extractor,
            schema: StaffDirectory::json_schema(),
            chunking,
        }
    }

    /// Extracts records, propagating extractor and parse failures
    ///
    /// Used when this is the only extraction attempt for a request.
    pub async fn extract(&self, page: &PageContent) -> Result<Vec<StaffMember>> {
        let raw = self
            .extractor
            .extract(
                page.semantic_input(),
                &self.schema,
                EXTRACTION_INSTRUCTION,
                &self.chunking,
            )
            .await?;

        let members = parse_extracted_content(&raw)?;
        tracing::debug!(
            "Semantic extraction found {} member(s) on {}",
            members.len(),
            page.url
        );
        Ok(members)
    }

    /// Extracts records, turning any failure into an empty result
    ///
    /// Used for individual pages of a paginated crawl.
    pub async fn extract_best_effort(&self, page: &PageContent) -> Vec<StaffMember> {
        match self.extract(page).await {
            Ok(members) => members,
            Err(e) => {
                tracing::warn!("Semantic extraction failed for {}: {}", page.url, e);
                Vec::new()
            }
        }
    }
}
