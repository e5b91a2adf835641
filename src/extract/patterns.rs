//! Rule-based extraction of contact data embedded in raw markup
//!
//! Three rules run in fixed priority order over the same markup:
//!
//! | Rule | Shape | Role |
//! |------|-------|------|
//! | Accessibility label | `aria-label="Send message to NAME at EMAIL"` | never |
//! | Mailto link | `<a href="mailto:EMAIL">NAME</a>, ROLE` | trailing text |
//! | Embedded JSON | `"email":"EMAIL", ... "name":"NAME"` | never |
//!
//! An email is emitted at most once per call; the first rule to accept it
//! wins. Within a rule, matches follow the left-to-right order of the markup.

use crate::model::{collapse_whitespace, decode_entities, strip_honorific, StaffMember};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static ARIA_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"aria-label="[Ss]end [Mm]essage to ([^"]+?) at ([a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,})""#,
    )
    .unwrap()
});

static MAILTO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"mailto:([a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,})[^>]*>([^<]+)</a>(?:[,\s]*([^<"\\]{2,50}))?"#,
    )
    .unwrap()
});

static EMBEDDED_JSON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)"(?:email|mail)":\s*"([^"]+@[^"]+)"[^}]*"(?:name|title|displayName)":\s*"([^"]+)""#,
    )
    .unwrap()
});

static ROLE_EDGES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[,\s*-]+|[,\s*]+$").unwrap());

/// Local parts that belong to shared mailboxes rather than people
const GENERIC_MAILBOXES: &[&str] = &["info", "contact", "office", "admin", "school", "support"];

/// Minimum characters a name must keep once its honorific is removed
const MIN_NAME_CHARS: usize = 2;

/// Extracts staff records from raw markup
///
/// Deterministic: identical markup always yields identical ordered output.
/// Returns an empty list when no rule matches.
pub fn extract_from_markup(html: &str) -> Vec<StaffMember> {
    let mut members = Vec::new();
    let mut seen_emails = HashSet::new();

    for (rule, found) in [
        ("aria-label", aria_label_rule(html)),
        ("mailto", mailto_rule(html)),
        ("embedded-json", embedded_json_rule(html)),
    ] {
        let mut accepted = 0;
        for member in found {
            let Some(email) = member.email.clone() else {
                continue;
            };
            if seen_emails.insert(email) {
                members.push(member);
                accepted += 1;
            }
        }
        tracing::debug!("Pattern rule {} accepted {} record(s)", rule, accepted);
    }

    members
}

/// Rule 1: "Send message to NAME at EMAIL" accessibility labels
fn aria_label_rule(html: &str) -> Vec<StaffMember> {
    ARIA_LABEL_RE
        .captures_iter(html)
        .filter_map(|caps| {
            let name = caps[1].trim();
            if name.chars().count() < MIN_NAME_CHARS {
                return None;
            }
            StaffMember::new(name, None, Some(&caps[2]))
        })
        .collect()
}

/// Rule 2: mailto anchors with the link text as name and trailing text as role
fn mailto_rule(html: &str) -> Vec<StaffMember> {
    MAILTO_RE
        .captures_iter(html)
        .filter_map(|caps| {
            let email = caps[1].trim().to_lowercase();
            if is_generic_mailbox(&email) {
                return None;
            }

            let name = caps[2].trim();
            // The link text is another address, already covered by the aria rule
            if name.contains('@') || !has_real_name(name) {
                return None;
            }

            let role = caps.get(3).and_then(|m| clean_role(m.as_str()));
            StaffMember::new(name, role.as_deref(), Some(&email))
        })
        .collect()
}

/// Rule 3: loose `"email": ..., "name": ...` pairs inside inline JSON
fn embedded_json_rule(html: &str) -> Vec<StaffMember> {
    EMBEDDED_JSON_RE
        .captures_iter(html)
        .filter_map(|caps| {
            let name = caps[2].trim();
            if !has_real_name(name) {
                return None;
            }
            StaffMember::new(name, None, Some(&caps[1]))
        })
        .collect()
}

/// Returns true if the address belongs to a shared mailbox
pub fn is_generic_mailbox(email: &str) -> bool {
    let email = email.to_lowercase();
    GENERIC_MAILBOXES
        .iter()
        .any(|prefix| email.starts_with(&format!("{}@", prefix)))
}

fn has_real_name(name: &str) -> bool {
    strip_honorific(name).chars().count() >= MIN_NAME_CHARS
}

/// Cleans the free text that trails a mailto link
///
/// Strips leading separators and dashes, decodes `&amp;`/`&nbsp;` and
/// collapses whitespace. Returns `None` if one character or less remains.
fn clean_role(raw: &str) -> Option<String> {
    let trimmed = ROLE_EDGES_RE.replace_all(raw.trim(), "");
    let role = collapse_whitespace(&decode_entities(&trimmed));
    (role.chars().count() > 1).then_some(role)
}
