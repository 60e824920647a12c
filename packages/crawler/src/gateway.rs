//! Persistence seam for crawl results.
//!
//! The crawler never writes durable rows itself: the API layer (or a review
//! queue) pushes accepted records through this trait. The in-memory
//! implementation backs tests and development.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{GatewayError, GatewayResult};
use crate::types::{ExtractedArtist, ExtractedStudio};

/// CRUD surface the data layer implements for crawled records.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    async fn create_studio(&self, studio: &ExtractedStudio) -> GatewayResult<()>;
    async fn update_studio(&self, studio: &ExtractedStudio) -> GatewayResult<()>;
    async fn delete_studio(&self, id: &str) -> GatewayResult<()>;
    async fn get_studio(&self, id: &str) -> GatewayResult<Option<ExtractedStudio>>;

    async fn create_artist(&self, artist: &ExtractedArtist) -> GatewayResult<()>;
    async fn update_artist(&self, artist: &ExtractedArtist) -> GatewayResult<()>;
    async fn delete_artist(&self, id: &str) -> GatewayResult<()>;
    async fn get_artist(&self, id: &str) -> GatewayResult<Option<ExtractedArtist>>;
}

/// In-memory gateway. Data is lost on restart; not for production.
#[derive(Default)]
pub struct MemoryGateway {
    studios: RwLock<HashMap<String, ExtractedStudio>>,
    artists: RwLock<HashMap<String, ExtractedArtist>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn studio_count(&self) -> usize {
        self.studios.read().unwrap().len()
    }

    pub fn artist_count(&self) -> usize {
        self.artists.read().unwrap().len()
    }
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn create_studio(&self, studio: &ExtractedStudio) -> GatewayResult<()> {
        self.studios
            .write()
            .unwrap()
            .insert(studio.id.clone(), studio.clone());
        Ok(())
    }

    async fn update_studio(&self, studio: &ExtractedStudio) -> GatewayResult<()> {
        let mut studios = self.studios.write().unwrap();
        if !studios.contains_key(&studio.id) {
            return Err(GatewayError::NotFound {
                id: studio.id.clone(),
            });
        }
        studios.insert(studio.id.clone(), studio.clone());
        Ok(())
    }

    async fn delete_studio(&self, id: &str) -> GatewayResult<()> {
        self.studios
            .write()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| GatewayError::NotFound { id: id.to_string() })
    }

    async fn get_studio(&self, id: &str) -> GatewayResult<Option<ExtractedStudio>> {
        Ok(self.studios.read().unwrap().get(id).cloned())
    }

    async fn create_artist(&self, artist: &ExtractedArtist) -> GatewayResult<()> {
        self.artists
            .write()
            .unwrap()
            .insert(artist.id.clone(), artist.clone());
        Ok(())
    }

    async fn update_artist(&self, artist: &ExtractedArtist) -> GatewayResult<()> {
        let mut artists = self.artists.write().unwrap();
        if !artists.contains_key(&artist.id) {
            return Err(GatewayError::NotFound {
                id: artist.id.clone(),
            });
        }
        artists.insert(artist.id.clone(), artist.clone());
        Ok(())
    }

    async fn delete_artist(&self, id: &str) -> GatewayResult<()> {
        self.artists
            .write()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| GatewayError::NotFound { id: id.to_string() })
    }

    async fn get_artist(&self, id: &str) -> GatewayResult<Option<ExtractedArtist>> {
        Ok(self.artists.read().unwrap().get(id).cloned())
    }
}
