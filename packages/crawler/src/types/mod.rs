//! Data types shared across the crawl pipeline.

pub mod config;
pub mod progress;
pub mod records;

pub use config::CrawlConfig;
pub use progress::{CrawlFailure, CrawlProgress, CrawlStatus};
pub use records::{ExtractedArtist, ExtractedStudio, StudioPage, DATA_SOURCE_CRAWLED};
