//! Heuristic HTML field extraction.
//!
//! Everything in this module is regex/string matching over raw markup; there
//! is no DOM parser. The heuristics never fail: a pattern that matches
//! nothing degrades to an empty or placeholder value, so a weird page costs
//! data quality, never the batch.
//!
//! - [`urls`] - studio link extraction from directory listing pages
//! - [`studio`] - studio-level field extraction from one page
//! - [`artists`] - per-artist sectioning and field extraction
//! - [`patterns`] - the site/keyword tables the above are driven by

pub mod artists;
pub mod patterns;
pub mod studio;
pub mod urls;

pub use artists::extract_artists;
pub use studio::extract_studio;
pub use urls::extract_studio_urls;

use crate::types::StudioPage;

/// Extract one studio and its artists from a fetched page.
///
/// Guarantees `artists.len() >= 1`: when no artist sections are found the
/// whole page is treated as describing a single generic studio artist.
pub fn extract_studio_page(html: &str, url: &str) -> StudioPage {
    let studio = extract_studio(html, url);
    let artists = extract_artists(html, url, &studio.id);
    StudioPage { studio, artists }
}

/// Strip tags to a whitespace-collapsed text blob for prose-field matching.
///
/// Script and style bodies are dropped entirely. `src=`/`href=` structure is
/// lost here on purpose; callers that need attributes work on the raw HTML.
pub fn strip_tags(html: &str) -> String {
    let script_pattern = regex::Regex::new(r"(?is)<script[^>]*>.*?</script>").unwrap();
    let style_pattern = regex::Regex::new(r"(?is)<style[^>]*>.*?</style>").unwrap();
    let tag_pattern = regex::Regex::new(r"<[^>]+>").unwrap();
    let whitespace = regex::Regex::new(r"\s+").unwrap();

    let text = script_pattern.replace_all(html, " ");
    let text = style_pattern.replace_all(&text, " ");
    let text = tag_pattern.replace_all(&text, " ");

    let text = text
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");

    whitespace.replace_all(&text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_tags_collapses_whitespace() {
        let html = "<div><p>Tokyo   Soul</p>\n\n<span>Ink</span></div>";
        assert_eq!(strip_tags(html), "Tokyo Soul Ink");
    }

    #[test]
    fn strip_tags_drops_script_and_style_bodies() {
        let html = r#"<style>.x{color:red}</style><script>alert("hi")</script><b>kept</b>"#;
        assert_eq!(strip_tags(html), "kept");
    }

    #[test]
    fn strip_tags_decodes_entities() {
        assert_eq!(strip_tags("Fish &amp; Ink"), "Fish & Ink");
    }

    #[test]
    fn extract_studio_page_always_yields_an_artist() {
        let page = extract_studio_page("<html><body>nothing useful</body></html>", "https://x.jp/");
        assert!(!page.artists.is_empty());
        assert_eq!(page.artists[0].studio_id, page.studio.id);
    }
}
