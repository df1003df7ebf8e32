//! HTML link extraction.
//!
//! Given a page body and the URL it was fetched from, produces the list of
//! outbound absolute URLs: anchors resolved against the base, normalized,
//! and filtered to valid http(s) targets. Duplicates within a page are kept
//! in document order so downstream consumers see the page's true multiset of
//! outgoing links.

use scraper::{Html, Selector};

use crate::config::Config;
use crate::url_utils;

/// Extract outbound absolute URLs from an HTML body.
///
/// Empty bodies and bodies over the safety bound yield an empty list.
pub fn extract_links(html: &str, base_url: &str) -> Vec<String> {
    if html.is_empty() || html.len() > Config::MAX_BODY_BYTES {
        return Vec::new();
    }

    let document = Html::parse_document(html);
    let anchor_selector = Selector::parse("a[href]").unwrap();

    let mut links = Vec::new();
    for element in document.select(&anchor_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        if href.is_empty() || href.len() > Config::MAX_URL_LEN {
            continue;
        }

        let Some(absolute) = url_utils::resolve_against(base_url, href) else {
            continue;
        };

        let normalized = url_utils::normalize_url(&absolute);
        if url_utils::is_valid_url(&normalized) {
            links.push(normalized);
        }
    }

    links
}
