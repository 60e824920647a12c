//! Partial studio/artist records produced by the extraction heuristics.
//!
//! These are *crawl results*, not durable rows: ids are minted per batch and
//! `studio_id` on an artist refers to a studio extracted in the same session.
//! The persistence layer decides what survives human review.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where an artist record came from. Crawled records always carry `"crawled"`
/// so the admin review queue can tell them apart from hand-entered rows.
pub const DATA_SOURCE_CRAWLED: &str = "crawled";

/// A studio record assembled from one fetched page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedStudio {
    /// Batch-local id, referenced by artists from the same page
    pub id: String,
    pub created_at: DateTime<Utc>,

    pub name_ja: String,
    pub name_en: String,
    pub bio_ja: String,
    pub bio_en: String,
    pub address_ja: String,
    pub address_en: String,

    /// First prefecture/city allowlist hit, empty if none matched
    pub location: String,

    pub instagram_handle: Option<String>,
    /// Up to the first three instagram.com/p/<id> links found on the page
    #[serde(default)]
    pub instagram_posts: Vec<String>,
    pub phone: Option<String>,
    pub email: Option<String>,

    /// Source URL the record was extracted from
    pub website: String,

    #[serde(default)]
    pub portfolio_images: Vec<String>,

    pub english_speaking: bool,
    pub lgbtq_friendly: bool,
    pub private_room: bool,
    pub parking: bool,
    pub card_payment: bool,
}

impl ExtractedStudio {
    /// Create an empty studio record for a source URL with a fresh id.
    pub fn new(website: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            name_ja: String::new(),
            name_en: String::new(),
            bio_ja: String::new(),
            bio_en: String::new(),
            address_ja: String::new(),
            address_en: String::new(),
            location: String::new(),
            instagram_handle: None,
            instagram_posts: Vec::new(),
            phone: None,
            email: None,
            website: website.into(),
            portfolio_images: Vec::new(),
            english_speaking: false,
            lgbtq_friendly: false,
            private_room: false,
            parking: false,
            card_payment: false,
        }
    }
}

/// An artist record assembled from a page fragment (or the whole page when no
/// per-artist sections were found).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedArtist {
    pub id: String,
    /// Same-batch foreign key to the owning [`ExtractedStudio`]
    pub studio_id: String,

    pub name_ja: String,
    pub name_en: String,
    pub bio_ja: String,
    pub bio_en: String,
    pub location: String,

    /// Free-text style tags, pre-taxonomy
    #[serde(default)]
    pub styles: Vec<String>,

    /// Deduped, capped at 20
    #[serde(default)]
    pub portfolio_images: Vec<String>,

    pub price_range: Option<String>,
    pub session_minimum: Option<String>,
    pub consultation_fee: Option<String>,

    pub instagram_handle: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// "instagram" | "email" | "website", inferred by priority
    pub booking_platform: String,

    pub data_source: String,
    pub website_url: String,
    pub last_updated: DateTime<Utc>,
}

impl ExtractedArtist {
    /// Create an empty crawled-artist record linked to a studio.
    pub fn new(studio_id: impl Into<String>, website_url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            studio_id: studio_id.into(),
            name_ja: String::new(),
            name_en: String::new(),
            bio_ja: String::new(),
            bio_en: String::new(),
            location: String::new(),
            styles: Vec::new(),
            portfolio_images: Vec::new(),
            price_range: None,
            session_minimum: None,
            consultation_fee: None,
            instagram_handle: None,
            phone: None,
            email: None,
            booking_platform: "website".to_string(),
            data_source: DATA_SOURCE_CRAWLED.to_string(),
            website_url: website_url.into(),
            last_updated: Utc::now(),
        }
    }
}

/// Everything extracted from one studio page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudioPage {
    pub studio: ExtractedStudio,
    pub artists: Vec<ExtractedArtist>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_records_are_linked_and_tagged() {
        let studio = ExtractedStudio::new("https://example.jp/studio");
        let artist = ExtractedArtist::new(&studio.id, &studio.website);

        assert_eq!(artist.studio_id, studio.id);
        assert_eq!(artist.data_source, DATA_SOURCE_CRAWLED);
        assert_eq!(artist.website_url, studio.website);
        assert_eq!(artist.booking_platform, "website");
    }

    #[test]
    fn studio_ids_are_unique_per_record() {
        let a = ExtractedStudio::new("https://a.example");
        let b = ExtractedStudio::new("https://b.example");
        assert_ne!(a.id, b.id);
    }
}
