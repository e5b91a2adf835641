//! Markdown-ish rendering of fetched HTML
//!
//! Produces the "cleaned text" view of a page: excluded tags are dropped,
//! block elements become lines, and mailto anchors keep their address as
//! `[text](mailto:addr)` so visible contact data survives.

use scraper::{ElementRef, Html, Node};

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption", "figure",
    "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "ol", "p", "pre",
    "section", "table", "tbody", "thead", "tr", "ul",
];

const ALWAYS_SKIPPED: &[&str] = &["head", "template", "noscript"];

/// Renders `html` to markdown, omitting elements named in `excluded_tags`
pub fn render_markdown(html: &str, excluded_tags: &[String]) -> String {
    let document = Html::parse_document(html);
    let mut out = String::new();
    render_element(document.root_element(), excluded_tags, &mut out);

    out.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_element(element: ElementRef<'_>, excluded: &[String], out: &mut String) {
    let name = element.value().name();
    if ALWAYS_SKIPPED.contains(&name) || excluded.iter().any(|t| t.eq_ignore_ascii_case(name)) {
        return;
    }

    let is_block = BLOCK_TAGS.contains(&name);
    if is_block {
        out.push('\n');
    }

    if let Some(level) = heading_level(name) {
        out.push_str(&"#".repeat(level));
        out.push(' ');
    }

    if name == "a" {
        if let Some(address) = element
            .value()
            .attr("href")
            .and_then(|href| href.trim().strip_prefix("mailto:"))
        {
            let text = element.text().collect::<String>();
            out.push_str(&format!("[{}](mailto:{})", text.trim(), address));
            return;
        }
    }

    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            render_element(child_element, excluded, out);
        } else if let Node::Text(text) = child.value() {
            out.push_str(text);
        }
    }

    match name {
        "td" | "th" => out.push_str(" | "),
        _ if is_block => out.push('\n'),
        _ => {}
    }
}

fn heading_level(name: &str) -> Option<usize> {
    match name {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}
