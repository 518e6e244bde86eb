//! Mock entity store and search indexer for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::store::{EntityStore, Image, SearchIndexer, StoreError, Studio};

/// In-memory implementation of the EntityStore trait.
///
/// Upserts replace by id, so the recorded lists never hold duplicates of
/// the same id.
#[derive(Debug, Clone, Default)]
pub struct MockEntityStore {
    studios: Arc<RwLock<Vec<Studio>>>,
    images: Arc<RwLock<Vec<Image>>>,
    next_error: Arc<RwLock<Option<StoreError>>>,
}

impl MockEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every studio upserted so far, in first-insert order.
    pub async fn studios(&self) -> Vec<Studio> {
        self.studios.read().await.clone()
    }

    /// Every image upserted so far, in first-insert order.
    pub async fn images(&self) -> Vec<Image> {
        self.images.read().await.clone()
    }

    /// Configure the next upsert to fail with the given error.
    pub async fn set_next_error(&self, error: StoreError) {
        *self.next_error.write().await = Some(error);
    }

    async fn take_error(&self) -> Option<StoreError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl EntityStore for MockEntityStore {
    async fn upsert_studio(&self, studio: &Studio) -> Result<(), StoreError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        let mut studios = self.studios.write().await;
        match studios.iter_mut().find(|s| s.id == studio.id) {
            Some(existing) => *existing = studio.clone(),
            None => studios.push(studio.clone()),
        }
        Ok(())
    }

    async fn upsert_image(&self, image: &Image) -> Result<(), StoreError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        let mut images = self.images.write().await;
        match images.iter_mut().find(|i| i.id == image.id) {
            Some(existing) => *existing = image.clone(),
            None => images.push(image.clone()),
        }
        Ok(())
    }
}

/// Recording implementation of the SearchIndexer trait.
#[derive(Debug, Clone, Default)]
pub struct MockSearchIndexer {
    studios: Arc<RwLock<Vec<String>>>,
    images: Arc<RwLock<Vec<String>>>,
    next_error: Arc<RwLock<Option<StoreError>>>,
}

impl MockSearchIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids of every studio indexed so far.
    pub async fn indexed_studios(&self) -> Vec<String> {
        self.studios.read().await.clone()
    }

    /// Ids of every image indexed so far.
    pub async fn indexed_images(&self) -> Vec<String> {
        self.images.read().await.clone()
    }

    /// Configure the next index call to fail with the given error.
    pub async fn set_next_error(&self, error: StoreError) {
        *self.next_error.write().await = Some(error);
    }

    async fn take_error(&self) -> Option<StoreError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl SearchIndexer for MockSearchIndexer {
    async fn index_studios(&self, studios: &[Studio]) -> Result<(), StoreError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        self.studios
            .write()
            .await
            .extend(studios.iter().map(|s| s.id.clone()));
        Ok(())
    }

    async fn index_images(&self, images: &[Image]) -> Result<(), StoreError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        self.images
            .write()
            .await
            .extend(images.iter().map(|i| i.id.clone()));
        Ok(())
    }
}
