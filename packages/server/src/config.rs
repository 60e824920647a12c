use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Upper bound on studio pages per crawl request; requests may ask for
    /// fewer but never more.
    pub max_studios_cap: usize,
    /// Optional overrides for the crawl pacing delays, in milliseconds.
    pub seed_delay_ms: Option<u64>,
    pub page_delay_ms: Option<u64>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            max_studios_cap: env::var("MAX_STUDIOS_CAP")
                .unwrap_or_else(|_| "50".to_string())
                .parse()
                .context("MAX_STUDIOS_CAP must be a valid number")?,
            seed_delay_ms: parse_optional_ms("SEED_DELAY_MS")?,
            page_delay_ms: parse_optional_ms("PAGE_DELAY_MS")?,
        })
    }
}

fn parse_optional_ms(var: &str) -> Result<Option<u64>> {
    match env::var(var) {
        Ok(value) => value
            .parse()
            .map(Some)
            .context(format!("{var} must be milliseconds")),
        Err(_) => Ok(None),
    }
}
