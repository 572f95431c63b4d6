//! Utility functions and helpers.

pub mod http;

use url::Url;

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Normalize text extracted from HTML: trim every text node and join them
/// without separators.
pub fn join_trimmed<'a>(nodes: impl IntoIterator<Item = &'a str>) -> String {
    nodes.into_iter().map(str::trim).collect()
}
