//! Entity storage - the catalogs extraction reads and the records merges write.
//!
//! The core never caches catalog contents: every extraction call asks the
//! [`CatalogProvider`] for a full, current snapshot of one entity kind.

mod sqlite;
mod types;

pub use sqlite::SqliteLibrary;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors for store and index operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Source of catalog snapshots, one entity kind at a time.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Return every known entry of `kind`.
    ///
    /// The snapshot must be complete; callers match against all of it.
    async fn get_all(&self, kind: EntityKind) -> Result<Vec<CatalogEntry>, StoreError>;
}

/// Persistence for entities created while merging plugin results.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Insert or replace a studio by id.
    async fn upsert_studio(&self, studio: &Studio) -> Result<(), StoreError>;

    /// Insert or replace an image by id.
    async fn upsert_image(&self, image: &Image) -> Result<(), StoreError>;
}

/// Search index that newly created entities are pushed into.
#[async_trait]
pub trait SearchIndexer: Send + Sync {
    async fn index_studios(&self, studios: &[Studio]) -> Result<(), StoreError>;

    async fn index_images(&self, images: &[Image]) -> Result<(), StoreError>;
}
