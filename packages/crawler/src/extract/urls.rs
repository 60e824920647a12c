//! Studio link extraction from directory listing pages.

use indexmap::IndexSet;
use tracing::debug;
use url::Url;

use super::patterns::{DIRECTORY_RULES, GENERIC_LINK_PATTERNS};

/// Extract candidate studio URLs from a directory page.
///
/// Applies the site-specific rule when the page's host is a known directory,
/// else falls back to the generic href patterns. Hrefs are resolved against
/// the page URL (relative paths included) and deduplicated in first-seen
/// order. Malformed hrefs are silently dropped.
pub fn extract_studio_urls(html: &str, page_url: &str) -> Vec<String> {
    let base = match Url::parse(page_url) {
        Ok(u) => u,
        Err(_) => {
            debug!(url = %page_url, "unparseable page URL, no links extracted");
            return Vec::new();
        }
    };

    let host = base.host_str().unwrap_or("");
    let patterns: Vec<&str> = match DIRECTORY_RULES.iter().find(|r| host.contains(r.host)) {
        Some(rule) => vec![rule.link_pattern],
        None => GENERIC_LINK_PATTERNS.to_vec(),
    };

    let mut found: IndexSet<String> = IndexSet::new();
    for pattern in patterns {
        let re = regex::Regex::new(pattern).unwrap();
        for cap in re.captures_iter(html) {
            let Some(href) = cap.get(1) else { continue };
            let href = href.as_str();

            if href.starts_with('#')
                || href.starts_with("javascript:")
                || href.starts_with("mailto:")
                || href.starts_with("tel:")
            {
                continue;
            }

            // Url::join failing means a malformed href; just skip it
            if let Ok(resolved) = base.join(href) {
                found.insert(resolved.to_string());
            }
        }
    }

    debug!(url = %page_url, count = found.len(), "extracted studio links");
    found.into_iter().collect()
}

/// Static fallback URLs for a seed whose fetch failed, if its host is known.
pub fn fallback_urls_for(seed_url: &str) -> Vec<String> {
    let host = Url::parse(seed_url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
        .unwrap_or_default();

    DIRECTORY_RULES
        .iter()
        .find(|r| host.contains(r.host))
        .map(|r| r.fallback_urls.iter().map(|u| u.to_string()).collect())
        .unwrap_or_default()
}
