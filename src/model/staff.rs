/// Staff record definitions and their validation rules
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Standard address pattern shared by the classifier and the extractors
pub const EMAIL_PATTERN: &str = r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("^{}$", EMAIL_PATTERN)).unwrap());

static HONORIFIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(Mr\.|Mrs\.|Ms\.|Dr\.|Prof\.)\s*").unwrap());

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// A single person listed in a staff directory
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct StaffMember {
    /// Full name of the staff member, exactly as shown (honorific preserved)
    pub name: String,

    /// Job title or position in the organization
    #[serde(default)]
    pub role: Option<String>,

    /// Email address from a mailto: link or visible text
    #[serde(default)]
    pub email: Option<String>,
}

impl StaffMember {
    /// Builds a validated record
    ///
    /// Returns `None` when the name is empty once an honorific prefix is
    /// removed, or when a present email does not look like an address.
    /// The role is whitespace-normalized and entity-decoded; a role that
    /// collapses to nothing is dropped.
    pub fn new(name: &str, role: Option<&str>, email: Option<&str>) -> Option<Self> {
        let name = collapse_whitespace(name);
        if strip_honorific(&name).is_empty() {
            return None;
        }

        let email = match email.map(str::trim).filter(|e| !e.is_empty()) {
            Some(raw) => Some(normalize_email(raw)?),
            None => None,
        };

        let role = role
            .map(|r| collapse_whitespace(&decode_entities(r)))
            .filter(|r| !r.is_empty());

        Some(Self { name, role, email })
    }

    /// Re-applies validation to a record produced outside this crate
    ///
    /// Unlike `new`, an email that does not look like an address
    /// ("N/A", "not listed") is treated as absent and the person is kept.
    pub fn validated(self) -> Option<Self> {
        let email = self.email.as_deref().and_then(normalize_email);
        Self::new(&self.name, self.role.as_deref(), email.as_deref())
    }

    /// Deduplication identity: the email, when present
    pub fn identity(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

/// Staff members found on a single page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StaffDirectory {
    /// List of staff members
    #[serde(default)]
    pub staff_members: Vec<StaffMember>,
}

impl StaffDirectory {
    /// JSON schema for a list of staff members, derived from the model
    pub fn json_schema() -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(StaffDirectory)).unwrap_or_default()
    }
}

/// Removes a leading honorific ("Mr.", "Mrs.", "Ms.", "Dr.", "Prof.")
pub fn strip_honorific(name: &str) -> &str {
    match HONORIFIC_RE.find(name) {
        Some(m) => name[m.end()..].trim(),
        None => name.trim(),
    }
}

/// Lower-cases and checks an email address
pub fn normalize_email(email: &str) -> Option<String> {
    let email = email.trim().to_lowercase();
    EMAIL_RE.is_match(&email).then_some(email)
}

/// Decodes the two entities commonly left in directory markup
pub fn decode_entities(text: &str) -> String {
    text.replace("&amp;", "&").replace("&nbsp;", " ")
}

/// Collapses runs of whitespace into single spaces and trims
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}
