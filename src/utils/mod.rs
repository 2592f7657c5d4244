//! Utility functions and helpers.

pub mod http;

use url::Url;

/// Resolve a potentially relative link target against the page URL.
///
/// Returns `None` for targets that cannot be joined or that do not point at
/// an http(s) resource (`javascript:`, `mailto:` and similar).
pub fn resolve_url(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    base.join(href)
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
}

/// Truncate a string to at most `max` characters for log output.
pub fn preview(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}
