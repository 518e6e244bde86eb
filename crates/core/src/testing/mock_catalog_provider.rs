//! Mock catalog provider for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::store::{CatalogEntry, CatalogProvider, EntityKind, StoreError};

/// In-memory implementation of the CatalogProvider trait.
///
/// Provides controllable behavior for testing:
/// - Configurable entries per entity kind
/// - Fetch counting, to assert catalogs are read fresh
/// - Simulated store failures
///
/// # Example
///
/// ```rust,ignore
/// use marquee_core::testing::MockCatalogProvider;
///
/// let catalogs = MockCatalogProvider::new();
/// catalogs.add_entry(EntityKind::Studio, CatalogEntry::new("st_1", "Studio Prime")).await;
///
/// let studios = catalogs.get_all(EntityKind::Studio).await?;
/// assert_eq!(studios.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockCatalogProvider {
    entries: Arc<RwLock<HashMap<EntityKind, Vec<CatalogEntry>>>>,
    fetches: Arc<RwLock<HashMap<EntityKind, usize>>>,
    next_error: Arc<RwLock<Option<StoreError>>>,
}

impl MockCatalogProvider {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Replace every entry of `kind`.
    pub async fn set_entries(&self, kind: EntityKind, entries: Vec<CatalogEntry>) {
        self.entries.write().await.insert(kind, entries);
    }

    /// Append one entry of `kind`.
    pub async fn add_entry(&self, kind: EntityKind, entry: CatalogEntry) {
        self.entries
            .write()
            .await
            .entry(kind)
            .or_default()
            .push(entry);
    }

    /// Remove all entries of every kind.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    // =========================================================================
    // Fetch Recording
    // =========================================================================

    /// Number of successful `get_all` calls for `kind`.
    pub async fn fetch_count(&self, kind: EntityKind) -> usize {
        self.fetches.read().await.get(&kind).copied().unwrap_or(0)
    }

    // =========================================================================
    // Error Injection
    // =========================================================================

    /// Configure the next fetch to fail with the given error.
    pub async fn set_next_error(&self, error: StoreError) {
        *self.next_error.write().await = Some(error);
    }

    /// Clear any pending error.
    pub async fn clear_next_error(&self) {
        *self.next_error.write().await = None;
    }

    async fn take_error(&self) -> Option<StoreError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl CatalogProvider for MockCatalogProvider {
    async fn get_all(&self, kind: EntityKind) -> Result<Vec<CatalogEntry>, StoreError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        *self.fetches.write().await.entry(kind).or_insert(0) += 1;

        Ok(self
            .entries
            .read()
            .await
            .get(&kind)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_entries_per_kind() {
        let catalogs = MockCatalogProvider::new();
        catalogs
            .add_entry(EntityKind::Studio, CatalogEntry::new("st_1", "Studio"))
            .await;
        catalogs
            .add_entry(EntityKind::Studio, CatalogEntry::new("st_2", "Studio Prime"))
            .await;

        let studios = catalogs.get_all(EntityKind::Studio).await.unwrap();
        assert_eq!(studios.len(), 2);
        assert_eq!(studios[1].id, "st_2");
        assert!(catalogs.get_all(EntityKind::Actor).await.unwrap().is_empty());
        assert_eq!(catalogs.fetch_count(EntityKind::Studio).await, 1);
    }

    #[tokio::test]
    async fn test_error_injection() {
        let catalogs = MockCatalogProvider::new();
        catalogs
            .set_next_error(StoreError::Unavailable("down".to_string()))
            .await;

        assert!(catalogs.get_all(EntityKind::Label).await.is_err());
        assert!(catalogs.get_all(EntityKind::Label).await.is_ok());
        assert_eq!(catalogs.fetch_count(EntityKind::Label).await, 1);
    }

    #[tokio::test]
    async fn test_clear_keeps_fetch_counts() {
        let catalogs = MockCatalogProvider::new();
        catalogs
            .add_entry(EntityKind::Label, CatalogEntry::new("la_1", "1080p"))
            .await;
        assert_eq!(catalogs.get_all(EntityKind::Label).await.unwrap().len(), 1);

        catalogs.clear().await;
        assert!(catalogs.get_all(EntityKind::Label).await.unwrap().is_empty());
        assert_eq!(catalogs.fetch_count(EntityKind::Label).await, 2);
    }

    #[tokio::test]
    async fn test_clear_next_error() {
        let catalogs = MockCatalogProvider::new();
        catalogs
            .set_next_error(StoreError::Unavailable("down".to_string()))
            .await;
        catalogs.clear_next_error().await;
        assert!(catalogs.get_all(EntityKind::Label).await.is_ok());
    }
}
