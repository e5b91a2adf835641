//! Numbered-page URL discovery
//!
//! Looks for links whose query string carries a page number under one of
//! the common keys and expands them into the full `1..=max` sequence.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use url::Url;

/// Query keys recognized as page numbers, in substitution priority order
const PAGE_KEYS: &[&str] = &["page", "page_no", "p", "const_page"];

static PAGE_LINK_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r#"(?i)href=["']([^"']*[?&](page_?(?:no)?)=(\d+)[^"']*)["']"#,
        r#"(?i)href=["']([^"']*[?&](p)=(\d+)[^"']*)["']"#,
        // Finalsite CMS
        r#"(?i)href=["']([^"']*[?&](const_page)=(\d+)[^"']*)["']"#,
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

/// How a multi-page directory will be traversed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaginationPlan {
    /// Every page has its own URL
    UrlSequence(Vec<Url>),
    /// No enumerable URLs; pages must be stepped through in one session
    Interactive,
}

/// Page links found in a document, keyed by page number
#[derive(Debug, Clone, Default)]
struct DiscoveredPages {
    urls: BTreeMap<u32, Url>,
    /// Query key of the most recent match, used when a sample URL carries none of `PAGE_KEYS`
    matched_key: Option<String>,
}

fn discover_page_links(html: &str, base_url: &Url) -> DiscoveredPages {
    let html = html.replace("&amp;", "&");
    let mut found = DiscoveredPages::default();

    for re in PAGE_LINK_RES.iter() {
        for caps in re.captures_iter(&html) {
            let Ok(page) = caps[3].parse::<u32>() else {
                continue;
            };
            let Ok(url) = base_url.join(&caps[1]) else {
                continue;
            };
            found.matched_key = Some(caps[2].to_string());
            found.urls.insert(page, url);
        }
    }

    found
}

/// Detects URL-based pagination
///
/// # Arguments
///
/// * `html` - Markup of the first page
/// * `base_url` - URL of that page, used to resolve relative links
/// * `limit` - Maximum number of URLs to produce
///
/// # Returns
///
/// * `Some(urls)` - Absolute URLs for pages `1..=max`, in page order, at most `limit` of them
/// * `None` - No page links, or none beyond page 1
pub fn detect_url_pagination(html: &str, base_url: &Url, limit: usize) -> Option<Vec<Url>> {
    expand_pages(discover_page_links(html, base_url), limit)
}

/// Chooses the traversal plan for a directory, capped at `max_pages` URLs
pub fn plan_pagination(html: &str, base_url: &Url, max_pages: usize) -> PaginationPlan {
    match detect_url_pagination(html, base_url, max_pages) {
        Some(urls) => PaginationPlan::UrlSequence(urls),
        None => PaginationPlan::Interactive,
    }
}

fn expand_pages(found: DiscoveredPages, limit: usize) -> Option<Vec<Url>> {
    let max_page = *found.urls.keys().next_back()?;
    if max_page <= 1 {
        return None;
    }

    let sample = found
        .urls
        .get(&2)
        .or_else(|| found.urls.values().next())?
        .clone();

    let urls = (1..=max_page)
        .take(limit)
        .map(|page| match found.urls.get(&page) {
            Some(url) => url.clone(),
            None => synthesize_page_url(&sample, page, found.matched_key.as_deref()),
        })
        .collect();

    Some(urls)
}

/// Rewrites the page-number parameter of `sample` to `page`
///
/// The first of `PAGE_KEYS` present in the query is replaced; if none is,
/// `fallback_key` is tried. Other parameters keep their order.
fn synthesize_page_url(sample: &Url, page: u32, fallback_key: Option<&str>) -> Url {
    let pairs: Vec<(String, String)> = sample
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let has_key = |key: &str| pairs.iter().any(|(k, _)| k.as_str() == key);
    let known: Option<&str> = PAGE_KEYS.iter().copied().find(|key| has_key(*key));
    let key = known.or_else(|| fallback_key.filter(|key| has_key(*key)));

    let mut url = sample.clone();
    url.set_fragment(None);
    let page = page.to_string();
    url.query_pairs_mut().clear().extend_pairs(pairs.iter().map(|(k, v)| {
        if Some(k.as_str()) == key {
            (k.as_str(), page.as_str())
        } else {
            (k.as_str(), v.as_str())
        }
    }));
    url
}
