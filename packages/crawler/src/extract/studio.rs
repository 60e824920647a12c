//! Studio-level field extraction from one fetched page.
//!
//! Prose fields (names, location, addresses, contact) match against the
//! stripped text blob; images and instagram posts match against the raw HTML
//! because `src=`/`href=` attributes carry structure stripping destroys.

use indexmap::IndexSet;

use super::patterns::{
    CARD_PAYMENT_KEYWORDS, ENGLISH_SPEAKING_KEYWORDS, IMAGE_EXCLUDE_KEYWORDS,
    IMAGE_INCLUDE_KEYWORDS, LGBTQ_FRIENDLY_KEYWORDS, LOCATIONS_EN, LOCATIONS_JA,
    PARKING_KEYWORDS, PRIVATE_ROOM_KEYWORDS, STYLE_KEYWORDS,
};
use super::strip_tags;
use crate::types::ExtractedStudio;

/// Studio pages keep at most this many portfolio images; the per-artist
/// variant is richer (see `artists::ARTIST_IMAGE_CAP`).
pub const STUDIO_IMAGE_CAP: usize = 10;

/// Placeholder names used when no name pattern matches.
pub const FALLBACK_NAME_JA: &str = "タトゥースタジオ";
pub const FALLBACK_NAME_EN: &str = "Tattoo Studio";

/// Static boilerplate bios. Studio-level bio scraping is intentionally not
/// attempted; the review queue replaces these with curated text.
pub const BOILERPLATE_BIO_JA: &str =
    "自動クロールで収集したスタジオ情報です。詳細は公式サイトをご確認ください。";
pub const BOILERPLATE_BIO_EN: &str =
    "Studio profile collected by automated crawling. See the official website for details.";

/// Extract a studio record from raw HTML.
///
/// Never fails: every heuristic miss degrades to an empty or placeholder
/// value rather than an error.
pub fn extract_studio(html: &str, url: &str) -> ExtractedStudio {
    let text = strip_tags(html);
    let lower = text.to_lowercase();

    let mut studio = ExtractedStudio::new(url);
    studio.name_ja = extract_name_ja(&text).unwrap_or_else(|| FALLBACK_NAME_JA.to_string());
    studio.name_en = extract_name_en(&text).unwrap_or_else(|| FALLBACK_NAME_EN.to_string());
    studio.bio_ja = BOILERPLATE_BIO_JA.to_string();
    studio.bio_en = BOILERPLATE_BIO_EN.to_string();
    studio.location = extract_location(&text).unwrap_or_default();
    studio.address_ja = extract_address_ja(&text).unwrap_or_default();
    studio.address_en = extract_address_en(&text).unwrap_or_default();
    studio.instagram_handle = extract_instagram_handle(&text);
    studio.instagram_posts = extract_instagram_posts(html);
    studio.phone = extract_phone(&text);
    studio.email = extract_email(&text);
    studio.portfolio_images = extract_images(html, STUDIO_IMAGE_CAP);

    studio.english_speaking = check_amenity(&lower, ENGLISH_SPEAKING_KEYWORDS);
    studio.lgbtq_friendly = check_amenity(&lower, LGBTQ_FRIENDLY_KEYWORDS);
    studio.private_room = check_amenity(&lower, PRIVATE_ROOM_KEYWORDS);
    studio.parking = check_amenity(&lower, PARKING_KEYWORDS);
    studio.card_payment = check_amenity(&lower, CARD_PAYMENT_KEYWORDS);

    studio
}

/// Japanese studio name: kana/kanji run ending in a studio-type suffix.
pub fn extract_name_ja(text: &str) -> Option<String> {
    let re = regex::Regex::new(
        r"([ぁ-んァ-ヶ一-龯ーA-Za-z0-9・]{1,20}(?:タトゥースタジオ|スタジオ|タトゥー|刺青))",
    )
    .unwrap();
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// English studio name: capitalized word run ending in Studio/Tattoo/Shop.
pub fn extract_name_en(text: &str) -> Option<String> {
    let re = regex::Regex::new(
        r"([A-Z][A-Za-z&'\-]*(?:\s+[A-Z][A-Za-z&'\-]*){0,3}\s+(?:Studio|Tattoo|Shop))",
    )
    .unwrap();
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// First allowlist hit anywhere in the text; Japanese entries win over
/// English ones.
pub fn extract_location(text: &str) -> Option<String> {
    for loc in LOCATIONS_JA {
        if text.contains(loc) {
            return Some((*loc).to_string());
        }
    }
    let lower = text.to_lowercase();
    for loc in LOCATIONS_EN {
        if lower.contains(&loc.to_lowercase()) {
            return Some((*loc).to_string());
        }
    }
    None
}

/// Japanese address: ward/city kanji run with trailing block numbers.
pub fn extract_address_ja(text: &str) -> Option<String> {
    let re = regex::Regex::new(
        r"([一-龯]{1,4}[都道府県])?([一-龯ぁ-ん]{1,8}[区市][一-龯ぁ-んァ-ヶ0-9０-９]{0,12}[0-9０-９][0-9０-９\-ー−丁目番地号]{0,12})",
    )
    .unwrap();
    re.captures(text)
        .map(|c| c.get(0).map(|m| m.as_str().trim().to_string()))
        .flatten()
}

/// English address: leading street number plus a street-type word.
pub fn extract_address_en(text: &str) -> Option<String> {
    let re = regex::Regex::new(
        r"(\d{1,4}[-\d]*\s+[A-Za-z .]{2,40}(?:Street|St\.?|Avenue|Ave\.?|Road|Rd\.?|Dori|Building|Bldg\.?))",
    )
    .unwrap();
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Subset of the bilingual style vocabulary present in the text.
/// English terms match case-insensitively.
pub fn extract_styles(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    STYLE_KEYWORDS
        .iter()
        .filter(|kw| {
            if kw.is_ascii() {
                lower.contains(&kw.to_lowercase())
            } else {
                text.contains(**kw)
            }
        })
        .map(|kw| (*kw).to_string())
        .collect()
}

/// Portfolio image candidates from `src=`/`data-src=` attributes.
///
/// Chrome assets (logo/icon/banner/...) are dropped; URLs with a positive
/// hint (tattoo/work/gallery/...) sort ahead of the rest. Deduped, capped.
pub fn extract_images(html: &str, cap: usize) -> Vec<String> {
    let re = regex::Regex::new(
        r#"(?i)(?:src|data-src)\s*=\s*["']([^"']+\.(?:jpe?g|png|webp|gif)[^"']*)["']"#,
    )
    .unwrap();

    let mut preferred: IndexSet<String> = IndexSet::new();
    let mut rest: IndexSet<String> = IndexSet::new();

    for cap_groups in re.captures_iter(html) {
        let Some(src) = cap_groups.get(1) else { continue };
        let src = src.as_str().to_string();
        let lower = src.to_lowercase();

        if IMAGE_EXCLUDE_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            continue;
        }
        if IMAGE_INCLUDE_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            preferred.insert(src);
        } else {
            rest.insert(src);
        }
    }

    preferred
        .into_iter()
        .chain(rest.into_iter())
        .take(cap)
        .collect()
}

/// Pricing info from Japanese or English phrasing.
///
/// Patterns are tried in priority order and at most one field is populated:
/// an explicit range beats a minimum, which beats a consultation fee.
pub fn extract_pricing(text: &str) -> (Option<String>, Option<String>, Option<String>) {
    // 料金: ¥10,000 ~ ¥30,000
    let range_ja =
        regex::Regex::new(r"料金[:：]?\s*[¥￥]\s*([0-9,]+)\s*[~〜]\s*[¥￥]?\s*([0-9,]+)").unwrap();
    if let Some(c) = range_ja.captures(text) {
        return (Some(format!("¥{} ~ ¥{}", &c[1], &c[2])), None, None);
    }

    // $100 - $300
    let range_en = regex::Regex::new(r"\$([0-9,]+)\s*[-–~]\s*\$?([0-9,]+)").unwrap();
    if let Some(c) = range_en.captures(text) {
        return (Some(format!("${} - ${}", &c[1], &c[2])), None, None);
    }

    // ミニマム ¥15,000 / from $150
    let min_ja = regex::Regex::new(r"(?:ミニマム|最低料金)[:：]?\s*[¥￥]\s*([0-9,]+)").unwrap();
    if let Some(c) = min_ja.captures(text) {
        return (None, Some(format!("¥{}", &c[1])), None);
    }
    let min_en = regex::Regex::new(r"(?i)from\s*\$([0-9,]+)").unwrap();
    if let Some(c) = min_en.captures(text) {
        return (None, Some(format!("from ${}", &c[1])), None);
    }

    // カウンセリング無料 / consultation fee: $50
    let consult_ja =
        regex::Regex::new(r"カウンセリング(?:料)?[:：]?\s*([¥￥]\s*[0-9,]+|無料)").unwrap();
    if let Some(c) = consult_ja.captures(text) {
        return (None, None, Some(c[1].trim().to_string()));
    }
    let consult_en =
        regex::Regex::new(r"(?i)consultation(?:\s*fee)?[:：]?\s*(\$[0-9,]+|free)").unwrap();
    if let Some(c) = consult_en.captures(text) {
        return (None, None, Some(c[1].to_string()));
    }

    (None, None, None)
}

/// Standard email pattern, first match.
pub fn extract_email(text: &str) -> Option<String> {
    let re = regex::Regex::new(r"[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}").unwrap();
    re.find(text).map(|m| m.as_str().to_string())
}

/// Japanese phone number: leading zero, grouped digits.
pub fn extract_phone(text: &str) -> Option<String> {
    let re = regex::Regex::new(r"0\d{1,4}[-ー()]?\d{1,4}[-ー()]?\d{3,4}").unwrap();
    re.find(text).map(|m| m.as_str().to_string())
}

/// First `@handle` token not glued to an email address.
pub fn extract_instagram_handle(text: &str) -> Option<String> {
    let re = regex::Regex::new(r"(?:^|[\s>(（])@([A-Za-z0-9_.]{2,30})").unwrap();
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// First three instagram post links found in the raw HTML.
pub fn extract_instagram_posts(html: &str) -> Vec<String> {
    let re = regex::Regex::new(r"instagram\.com/p/([A-Za-z0-9_\-]+)").unwrap();
    let mut posts: IndexSet<String> = IndexSet::new();
    for cap in re.captures_iter(html) {
        posts.insert(format!("https://www.instagram.com/p/{}/", &cap[1]));
        if posts.len() == 3 {
            break;
        }
    }
    posts.into_iter().collect()
}

/// Booking platform by priority: instagram mention, then email, then website.
pub fn infer_booking_platform(
    lower_text: &str,
    instagram_handle: &Option<String>,
    email: &Option<String>,
) -> String {
    if instagram_handle.is_some() || lower_text.contains("instagram") {
        "instagram".to_string()
    } else if email.is_some() {
        "email".to_string()
    } else {
        "website".to_string()
    }
}

/// Independent keyword-membership check for one amenity flag.
pub fn check_amenity(lower_text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| {
        if kw.is_ascii() {
            lower_text.contains(&kw.to_lowercase())
        } else {
            lower_text.contains(*kw)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        <html><head><title>tokyo soul ink — home</title></head><body>
        <h1>Tokyo Soul Tattoo</h1>
        <p>渋谷のタトゥースタジオ。和彫り and blackwork specialists.</p>
        <p>東京都渋谷区神南1-2-3 / 3-5 Cat Street</p>
        <p>料金: ¥15,000 ~ ¥40,000 カウンセリング無料</p>
        <p>Contact: booking@tokyosoul.jp / 03-1234-5678 / @tokyosoul_ink</p>
        <p>English speaking staff. Private room available. クレジットカード可</p>
        <img src="/img/works/tattoo-dragon.jpg">
        <img src="/img/site-logo.png">
        <img data-src="/gallery/backpiece.webp">
        <a href="https://instagram.com/p/Abc123/">post</a>
        <a href="https://instagram.com/p/Def456/">post</a>
        </body></html>
    "#;

    #[test]
    fn extracts_bilingual_names() {
        let studio = extract_studio(SAMPLE, "https://tokyosoul.jp/");
        assert_eq!(studio.name_en, "Tokyo Soul Tattoo");
        assert!(studio.name_ja.ends_with("タトゥースタジオ"));
    }

    #[test]
    fn falls_back_to_placeholder_names() {
        let studio = extract_studio("<p>nothing here</p>", "https://x.jp/");
        assert_eq!(studio.name_en, FALLBACK_NAME_EN);
        assert_eq!(studio.name_ja, FALLBACK_NAME_JA);
    }

    #[test]
    fn location_prefers_japanese_allowlist() {
        // 東京 appears via 東京都; the JA list is checked first
        let studio = extract_studio(SAMPLE, "https://tokyosoul.jp/");
        assert_eq!(studio.location, "東京");
    }

    #[test]
    fn styles_are_the_matched_subset() {
        let styles = extract_styles("We do 和彫り, Blackwork and realism here");
        assert!(styles.contains(&"和彫り".to_string()));
        assert!(styles.contains(&"blackwork".to_string()));
        assert!(styles.contains(&"realism".to_string()));
        assert!(!styles.contains(&"tribal".to_string()));
    }

    #[test]
    fn images_exclude_chrome_and_prefer_work_shots() {
        let studio = extract_studio(SAMPLE, "https://tokyosoul.jp/");
        assert!(studio
            .portfolio_images
            .iter()
            .any(|i| i.contains("tattoo-dragon")));
        assert!(studio
            .portfolio_images
            .iter()
            .any(|i| i.contains("backpiece")));
        assert!(!studio.portfolio_images.iter().any(|i| i.contains("logo")));
    }

    #[test]
    fn image_cap_is_enforced() {
        let mut html = String::new();
        for i in 0..30 {
            html.push_str(&format!(r#"<img src="/works/piece-{i}.jpg">"#));
        }
        assert_eq!(extract_images(&html, STUDIO_IMAGE_CAP).len(), STUDIO_IMAGE_CAP);
    }

    #[test]
    fn pricing_range_wins_over_consultation() {
        let (range, minimum, consult) =
            extract_pricing("料金: ¥15,000 ~ ¥40,000 カウンセリング無料");
        assert_eq!(range.as_deref(), Some("¥15,000 ~ ¥40,000"));
        assert_eq!(minimum, None);
        assert_eq!(consult, None);
    }

    #[test]
    fn pricing_minimum_from_english_phrasing() {
        let (range, minimum, _) = extract_pricing("Custom work from $150 per piece");
        assert_eq!(range, None);
        assert_eq!(minimum.as_deref(), Some("from $150"));
    }

    #[test]
    fn contact_extraction() {
        let studio = extract_studio(SAMPLE, "https://tokyosoul.jp/");
        assert_eq!(studio.email.as_deref(), Some("booking@tokyosoul.jp"));
        assert_eq!(studio.phone.as_deref(), Some("03-1234-5678"));
        assert_eq!(studio.instagram_handle.as_deref(), Some("tokyosoul_ink"));
        assert_eq!(studio.instagram_posts.len(), 2);
        assert!(studio.instagram_posts[0].contains("/p/Abc123/"));
    }

    #[test]
    fn handle_does_not_match_email_at_sign() {
        assert_eq!(extract_instagram_handle("mail me at info@studio.jp"), None);
    }

    #[test]
    fn instagram_posts_cap_at_three() {
        let html = r#"
            instagram.com/p/a1 instagram.com/p/b2
            instagram.com/p/c3 instagram.com/p/d4
        "#;
        assert_eq!(extract_instagram_posts(html).len(), 3);
    }

    #[test]
    fn amenity_flags() {
        let studio = extract_studio(SAMPLE, "https://tokyosoul.jp/");
        assert!(studio.english_speaking);
        assert!(studio.private_room);
        assert!(studio.card_payment);
        assert!(!studio.parking);
        assert!(!studio.lgbtq_friendly);
    }

    #[test]
    fn booking_platform_priority() {
        assert_eq!(
            infer_booking_platform("find us on instagram", &None, &None),
            "instagram"
        );
        assert_eq!(
            infer_booking_platform("", &None, &Some("a@b.jp".into())),
            "email"
        );
        assert_eq!(infer_booking_platform("", &None, &None), "website");
    }

    #[test]
    fn provenance_is_the_source_url() {
        let studio = extract_studio(SAMPLE, "https://tokyosoul.jp/about");
        assert_eq!(studio.website, "https://tokyosoul.jp/about");
    }
}
