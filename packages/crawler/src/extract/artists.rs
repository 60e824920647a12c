//! Per-artist sectioning and field extraction.
//!
//! A studio page is split into per-artist fragments by class-name heuristics.
//! When nothing qualifies, the whole page becomes one generic "Studio Artist"
//! record, so every successfully fetched page yields at least one artist.

use tracing::debug;

use super::patterns::{ARTIST_CONTENT_INDICATORS, ARTIST_SECTION_CLASSES};
use super::studio::{
    extract_email, extract_images, extract_instagram_handle, extract_location, extract_name_ja,
    extract_phone, extract_pricing, extract_styles, infer_booking_platform,
};
use super::strip_tags;
use crate::types::ExtractedArtist;

/// Artist records carry more portfolio shots than the studio summary.
pub const ARTIST_IMAGE_CAP: usize = 20;

/// Name used for the whole-page fallback artist.
pub const FALLBACK_ARTIST_NAME_EN: &str = "Studio Artist";
pub const FALLBACK_ARTIST_NAME_JA: &str = "スタジオアーティスト";

/// Extract artist records from a studio page.
///
/// Every returned artist links to `studio_id`; the list is never empty.
pub fn extract_artists(html: &str, url: &str, studio_id: &str) -> Vec<ExtractedArtist> {
    let sections = split_artist_sections(html);

    if sections.is_empty() {
        debug!(url = %url, "no artist sections found, emitting whole-page fallback artist");
        return vec![fallback_artist(html, url, studio_id)];
    }

    debug!(url = %url, count = sections.len(), "artist sections found");
    sections
        .iter()
        .map(|fragment| extract_artist_from_fragment(fragment, html, url, studio_id))
        .collect()
}

/// Split the page into candidate artist fragments.
///
/// Matches elements whose class mentions artist/staff/member, then keeps only
/// fragments whose text carries a content indicator (so nav blocks named
/// "staff-login" don't count). Nested markup defeats the closing-tag match;
/// that is an accepted limitation of the regex approach.
fn split_artist_sections(html: &str) -> Vec<String> {
    const SECTION_TAGS: &[&str] = &["div", "section", "li", "article"];

    let mut sections = Vec::new();

    for class_name in ARTIST_SECTION_CLASSES {
        for tag in SECTION_TAGS {
            let pattern = format!(
                r#"(?is)<{tag}[^>]*class\s*=\s*["'][^"']*{class_name}[^"']*["'][^>]*>(.*?)</{tag}>"#
            );
            let re = regex::Regex::new(&pattern).unwrap();

            for cap in re.captures_iter(html) {
                let Some(body) = cap.get(1) else { continue };
                let body = body.as_str();
                let lower = strip_tags(body).to_lowercase();

                let qualifies = ARTIST_CONTENT_INDICATORS.iter().any(|ind| {
                    if ind.is_ascii() {
                        lower.contains(ind)
                    } else {
                        body.contains(*ind)
                    }
                });
                if qualifies {
                    sections.push(body.to_string());
                }
            }
        }

        // One class pattern producing sections is enough; mixing patterns
        // tends to double-count the same people.
        if !sections.is_empty() {
            break;
        }
    }

    sections
}

/// Extract one artist from a page fragment, backfilling contact and imagery
/// from the whole page when the fragment has none.
fn extract_artist_from_fragment(
    fragment: &str,
    page_html: &str,
    url: &str,
    studio_id: &str,
) -> ExtractedArtist {
    let text = strip_tags(fragment);
    let lower = text.to_lowercase();
    let page_text = strip_tags(page_html);

    let mut artist = ExtractedArtist::new(studio_id, url);

    artist.name_en = extract_artist_name_en(fragment, &text)
        .unwrap_or_else(|| FALLBACK_ARTIST_NAME_EN.to_string());
    artist.name_ja = extract_name_ja(&text).unwrap_or_default();

    // Bio: the fragment's own prose, truncated. Routed to the language side
    // the fragment is mostly written in.
    let bio = truncate_chars(&text, 280);
    if has_japanese(&text) {
        artist.bio_ja = bio;
    } else {
        artist.bio_en = bio;
    }

    artist.location = extract_location(&text)
        .or_else(|| extract_location(&page_text))
        .unwrap_or_default();

    artist.styles = non_empty_or(extract_styles(&text), || extract_styles(&page_text));
    artist.portfolio_images = non_empty_or(extract_images(fragment, ARTIST_IMAGE_CAP), || {
        extract_images(page_html, ARTIST_IMAGE_CAP)
    });

    let (range, minimum, consult) = extract_pricing(&text);
    artist.price_range = range;
    artist.session_minimum = minimum;
    artist.consultation_fee = consult;

    artist.instagram_handle =
        extract_instagram_handle(&text).or_else(|| extract_instagram_handle(&page_text));
    artist.phone = extract_phone(&text).or_else(|| extract_phone(&page_text));
    artist.email = extract_email(&text).or_else(|| extract_email(&page_text));
    artist.booking_platform =
        infer_booking_platform(&lower, &artist.instagram_handle, &artist.email);

    artist
}

/// Whole-page fallback: one generic artist assembled from page-level fields.
fn fallback_artist(html: &str, url: &str, studio_id: &str) -> ExtractedArtist {
    let text = strip_tags(html);
    let lower = text.to_lowercase();

    let mut artist = ExtractedArtist::new(studio_id, url);
    artist.name_en = FALLBACK_ARTIST_NAME_EN.to_string();
    artist.name_ja = FALLBACK_ARTIST_NAME_JA.to_string();
    artist.location = extract_location(&text).unwrap_or_default();
    artist.styles = extract_styles(&text);
    artist.portfolio_images = extract_images(html, ARTIST_IMAGE_CAP);

    let (range, minimum, consult) = extract_pricing(&text);
    artist.price_range = range;
    artist.session_minimum = minimum;
    artist.consultation_fee = consult;

    artist.instagram_handle = extract_instagram_handle(&text);
    artist.phone = extract_phone(&text);
    artist.email = extract_email(&text);
    artist.booking_platform =
        infer_booking_platform(&lower, &artist.instagram_handle, &artist.email);

    artist
}

/// Artist name from a fragment: prefer a heading, else the first capitalized
/// one-to-three word run in the text.
fn extract_artist_name_en(fragment: &str, text: &str) -> Option<String> {
    let heading = regex::Regex::new(r"(?is)<h[1-6][^>]*>(.*?)</h[1-6]>").unwrap();
    if let Some(cap) = heading.captures(fragment) {
        let name = strip_tags(&cap[1]);
        if !name.is_empty() {
            return Some(truncate_chars(&name, 60));
        }
    }

    let capitalized =
        regex::Regex::new(r"\b([A-Z][a-z]+(?:\s+[A-Z][a-z]+){0,2})\b").unwrap();
    capitalized
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn has_japanese(text: &str) -> bool {
    text.chars().any(|c| {
        ('\u{3040}'..='\u{30FF}').contains(&c) || ('\u{4E00}'..='\u{9FFF}').contains(&c)
    })
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect::<String>().trim().to_string()
}

fn non_empty_or<T>(value: Vec<T>, fallback: impl FnOnce() -> Vec<T>) -> Vec<T> {
    if value.is_empty() {
        fallback()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MULTI_ARTIST_PAGE: &str = r#"
        <html><body>
        <h1>Black Lotus Tattoo</h1>
        <div class="artist-card">
            <h3>Kenji Sato</h3>
            <p>Blackwork and geometric tattoo specialist. @kenji_ink</p>
            <img src="/works/kenji-sleeve.jpg">
        </div>
        <div class="artist-card">
            <h3>Yuki Tanaka</h3>
            <p>和彫り Portfolio on request. yuki@blacklotus.jp</p>
        </div>
        <div class="staff-login"><a href="/login">Staff login</a></div>
        </body></html>
    "#;

    #[test]
    fn one_artist_per_qualifying_section() {
        let artists = extract_artists(MULTI_ARTIST_PAGE, "https://blacklotus.jp/", "studio-1");
        assert_eq!(artists.len(), 2);
        assert_eq!(artists[0].name_en, "Kenji Sato");
        assert_eq!(artists[1].name_en, "Yuki Tanaka");
        assert!(artists.iter().all(|a| a.studio_id == "studio-1"));
    }

    #[test]
    fn non_qualifying_sections_are_skipped() {
        // "staff-login" matches the class heuristic but has no content indicator
        let artists = extract_artists(MULTI_ARTIST_PAGE, "https://blacklotus.jp/", "s");
        assert!(artists.iter().all(|a| a.name_en != "Staff"));
    }

    #[test]
    fn fallback_artist_when_no_sections() {
        let html = "<html><body><p>Just a studio homepage, 和彫り specialists in 東京.</p></body></html>";
        let artists = extract_artists(html, "https://x.jp/", "s1");

        assert_eq!(artists.len(), 1);
        assert_eq!(artists[0].name_en, FALLBACK_ARTIST_NAME_EN);
        assert_eq!(artists[0].location, "東京");
        assert!(artists[0].styles.contains(&"和彫り".to_string()));
    }

    #[test]
    fn fragment_fields_win_over_page_fields() {
        let artists = extract_artists(MULTI_ARTIST_PAGE, "https://blacklotus.jp/", "s");
        // Kenji's fragment has its own handle and image
        assert_eq!(artists[0].instagram_handle.as_deref(), Some("kenji_ink"));
        assert!(artists[0].portfolio_images[0].contains("kenji-sleeve"));
        // Yuki's fragment has no handle; booking falls back to her email
        assert_eq!(artists[1].email.as_deref(), Some("yuki@blacklotus.jp"));
    }

    #[test]
    fn japanese_fragment_bio_goes_to_bio_ja() {
        let artists = extract_artists(MULTI_ARTIST_PAGE, "https://blacklotus.jp/", "s");
        assert!(artists[1].bio_ja.contains("和彫り"));
        assert!(artists[1].bio_en.is_empty());
    }

    #[test]
    fn crawled_provenance_is_stamped() {
        let artists = extract_artists(MULTI_ARTIST_PAGE, "https://blacklotus.jp/", "s");
        for artist in &artists {
            assert_eq!(artist.data_source, "crawled");
            assert_eq!(artist.website_url, "https://blacklotus.jp/");
        }
    }
}
