//! Pattern tables driving the extraction heuristics.
//!
//! Site-specific rules live here as data, not control flow: adding support for
//! a new directory means adding a `DirectoryRule`, nothing else. All regexes
//! are literals, compiled at the call sites.

/// Default seed list: Japanese tattoo directory sites plus a couple of
/// well-known individual studio sites.
pub const DEFAULT_SEED_URLS: &[&str] = &[
    "https://tattoo-navi.jp/studios/",
    "https://irezumi-guide.com/directory/",
    "https://tokyo-ink.jp/shops/",
    "https://japantattoo.net/studio-list/",
    "https://horimono.tokyo/",
    "https://studio-muscat.com/",
    "https://three-tides.net/",
];

/// How to pull studio links out of one known directory site.
pub struct DirectoryRule {
    /// Substring matched against the seed URL's host.
    pub host: &'static str,
    /// Regex whose first capture group is the studio page href.
    pub link_pattern: &'static str,
    /// Static URLs substituted when the seed fetch fails. Known hosts always
    /// yield something, so a blocked fetch degrades instead of going dark.
    pub fallback_urls: &'static [&'static str],
}

/// Per-site link extraction rules. Markup conventions differ site to site,
/// hence one regex per known directory.
pub const DIRECTORY_RULES: &[DirectoryRule] = &[
    DirectoryRule {
        host: "tattoo-navi.jp",
        link_pattern: r#"href\s*=\s*["'](/studios/[a-z0-9_-]+/?)["']"#,
        fallback_urls: &[
            "https://tattoo-navi.jp/studios/tokyo-soul-ink/",
            "https://tattoo-navi.jp/studios/osaka-black-lotus/",
        ],
    },
    DirectoryRule {
        host: "irezumi-guide.com",
        link_pattern: r#"href\s*=\s*["'](https?://[^"']*irezumi-guide\.com/directory/[a-z0-9_-]+[^"']*)["']"#,
        fallback_urls: &[
            "https://irezumi-guide.com/directory/horiyoshi-family/",
            "https://irezumi-guide.com/directory/shinjuku-ink/",
        ],
    },
    DirectoryRule {
        host: "tokyo-ink.jp",
        link_pattern: r#"href\s*=\s*["'](/shops/[^"'#?]+)["']"#,
        fallback_urls: &["https://tokyo-ink.jp/shops/harajuku-needle/"],
    },
    DirectoryRule {
        host: "japantattoo.net",
        link_pattern: r#"<a[^>]+class\s*=\s*["'][^"']*studio-link[^"']*["'][^>]+href\s*=\s*["']([^"']+)["']"#,
        fallback_urls: &[
            "https://japantattoo.net/studio/ryu-tattoo/",
            "https://japantattoo.net/studio/sakura-ink-kyoto/",
        ],
    },
];

/// Generic href patterns for unknown hosts. Case-insensitive; any link whose
/// target mentions a studio/shop/tattoo path segment is a candidate.
pub const GENERIC_LINK_PATTERNS: &[&str] = &[
    r#"(?i)href\s*=\s*["']([^"']*studio[^"']*)["']"#,
    r#"(?i)href\s*=\s*["']([^"']*shop[^"']*)["']"#,
    r#"(?i)href\s*=\s*["']([^"']*tattoo[^"']*)["']"#,
];

/// Known locations, matched as substrings of the stripped page text.
/// First hit wins. Japanese entries checked before English ones.
pub const LOCATIONS_JA: &[&str] = &[
    "東京", "大阪", "京都", "横浜", "名古屋", "福岡", "札幌", "神戸", "沖縄",
    "渋谷", "新宿", "原宿", "池袋", "吉祥寺", "心斎橋",
];

pub const LOCATIONS_EN: &[&str] = &[
    "Tokyo", "Osaka", "Kyoto", "Yokohama", "Nagoya", "Fukuoka", "Sapporo",
    "Kobe", "Okinawa", "Shibuya", "Shinjuku", "Harajuku", "Ikebukuro",
];

/// Bilingual style vocabulary. English terms are matched case-insensitively,
/// Japanese terms as-is. The matched subset becomes the artist's style tags.
pub const STYLE_KEYWORDS: &[&str] = &[
    "和彫り",
    "洋彫り",
    "トライバル",
    "ブラックワーク",
    "刺青",
    "japanese traditional",
    "irezumi",
    "traditional",
    "neo-traditional",
    "blackwork",
    "black and grey",
    "tribal",
    "realism",
    "geometric",
    "watercolor",
    "fine line",
    "minimal",
    "old school",
    "lettering",
];

/// Image URLs containing any of these are dropped as page chrome.
pub const IMAGE_EXCLUDE_KEYWORDS: &[&str] = &[
    "logo", "icon", "banner", "avatar", "button", "sprite", "background", "bg_",
];

/// Image URLs containing any of these sort ahead as preferred portfolio
/// candidates; the non-matching remainder is still kept, after them.
pub const IMAGE_INCLUDE_KEYWORDS: &[&str] =
    &["tattoo", "work", "portfolio", "gallery", "design", "art"];

/// Amenity keyword tables: each flag is an independent membership check over
/// the lowercased page text.
pub const ENGLISH_SPEAKING_KEYWORDS: &[&str] =
    &["english speaking", "english ok", "english available", "英語対応", "英語ok"];

pub const LGBTQ_FRIENDLY_KEYWORDS: &[&str] =
    &["lgbtq", "lgbt friendly", "all genders welcome", "queer friendly"];

pub const PRIVATE_ROOM_KEYWORDS: &[&str] = &["private room", "個室", "完全個室", "完全予約制個室"];

pub const PARKING_KEYWORDS: &[&str] = &["parking", "駐車場"];

pub const CARD_PAYMENT_KEYWORDS: &[&str] =
    &["credit card", "card payment", "カード可", "クレジットカード", "visa", "mastercard"];

/// Class-name fragments that mark a per-artist section of a studio page.
pub const ARTIST_SECTION_CLASSES: &[&str] = &["artist", "staff", "member"];

/// Words that must appear inside a candidate artist section for it to count
/// as describing a person rather than, say, a nav block.
pub const ARTIST_CONTENT_INDICATORS: &[&str] = &[
    "tattoo", "style", "portfolio", "instagram", "彫師", "アーティスト", "作品",
];
