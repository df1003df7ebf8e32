//! URL helper functions used throughout the crawler

use url::Url;

use crate::config::Config;

/// Normalize a URL into its canonical byte form.
///
/// Strips the fragment, trims surrounding whitespace, lowercases the whole
/// string, and removes the trailing slash when the path is just `/`. Two URLs
/// are considered the same page iff their normalized strings are equal.
pub fn normalize_url(url: &str) -> String {
    let without_fragment = match url.split_once('#') {
        Some((head, _)) => head,
        None => url,
    };

    let mut normalized = without_fragment.trim().to_ascii_lowercase();

    // Strip the trailing slash only for bare-host URLs (https://host/).
    if normalized.ends_with('/') {
        if let Some(scheme_end) = normalized.find("://") {
            let rest = &normalized[scheme_end + 3..];
            if rest.len() > 1 && !rest[..rest.len() - 1].contains('/') {
                normalized.pop();
            }
        }
    }

    normalized
}

/// Extract the domain of a URL: the host with any leading `www.` removed,
/// lowercased. Returns `None` for unparseable URLs or empty hosts.
pub fn extract_domain(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    let domain = host.strip_prefix("www.").unwrap_or(host).to_ascii_lowercase();

    if domain.is_empty() {
        None
    } else {
        Some(domain)
    }
}

/// Check whether a URL is eligible for the frontier: http(s) scheme, within
/// the length cap, and carrying a nonempty domain.
pub fn is_valid_url(url: &str) -> bool {
    if !has_http_scheme(url) || url.len() > Config::MAX_URL_LEN {
        return false;
    }

    extract_domain(url).is_some()
}

/// Check for an `http://` or `https://` prefix.
pub fn has_http_scheme(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Resolve a link against the provided base URL.
pub fn resolve_against(base_url: &str, link: &str) -> Option<String> {
    let base = Url::parse(base_url).ok()?;
    let absolute = base.join(link).ok()?;
    Some(absolute.to_string())
}
