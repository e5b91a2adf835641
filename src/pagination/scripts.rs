//! Page-side scripts for interactive pagination
//!
//! The fetcher runs these inside the live page. The click script records
//! a content signature and activates the first visible, enabled "next"
//! control; the wait predicate holds once the signature differs.

use crate::config::PaginationConfig;

/// Characters of region text that make up a content signature
pub const SIGNATURE_LENGTH: usize = 500;

/// Window property holding the signature taken before the click
const SIGNATURE_SLOT: &str = "__lastContentHash";

/// Scripts for one paginated run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationScripts {
    /// Clicks the next-page control; evaluates to `true` if one was activated
    pub click_next: String,

    /// Predicate that holds once the content region has changed
    pub wait_for_change: String,
}

impl PaginationScripts {
    pub fn new(config: &PaginationConfig) -> Self {
        Self {
            click_next: click_next_script(&config.selectors(), &config.content_selector),
            wait_for_change: wait_for_change_script(&config.content_selector),
        }
    }
}

/// JS expression yielding the signature of the content region
fn signature_expr(content_selector: &str) -> String {
    format!(
        "((document.querySelector({}) || document.body).innerText || '').substring(0, {})",
        js_string(content_selector),
        SIGNATURE_LENGTH
    )
}

fn click_next_script(selectors: &[&str], content_selector: &str) -> String {
    let selector_list = serde_json::to_string(selectors).unwrap_or_else(|_| "[]".to_string());
    format!(
        r#"(() => {{
    const selectors = {selector_list};
    for (const selector of selectors) {{
        try {{
            const btn = document.querySelector(selector);
            if (btn && !btn.disabled && btn.offsetParent !== null) {{
                window.{SIGNATURE_SLOT} = {signature};
                btn.click();
                return true;
            }}
        }} catch (e) {{}}
    }}
    return false;
}})();"#,
        signature = signature_expr(content_selector),
    )
}

fn wait_for_change_script(content_selector: &str) -> String {
    format!(
        "() => {{\n    const current = {};\n    return current !== window.{};\n}}",
        signature_expr(content_selector),
        SIGNATURE_SLOT
    )
}

/// Quotes `value` as a JS string literal
fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"body\"".to_string())
}
