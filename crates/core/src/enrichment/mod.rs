//! Enrichment - merging plugin results into movies.
//!
//! Plugin output is untrusted. Fields are applied in a fixed order, each
//! under its own rule:
//!
//! 1. Covers (`frontCover`, `backCover`, `spineCover`): only image ids, and
//!    only into an empty slot unless thumbnail overwrite is allowed.
//! 2. Scalars (`name`, `description`, `releaseDate`, `rating`, `favorite`,
//!    `bookmark`): always overwrite when the type (and range) is right.
//! 3. `custom`: each key is resolved to a custom field; the first resolved
//!    field is overwritten.
//! 4. `studio`: only when the movie has none; matched by name, or created
//!    when creation of missing studios is enabled.
//!
//! A field that fails its check is skipped and the movie keeps its prior
//! value. Only infrastructure failures (catalog, store, index) abort a merge.
//!
//! Concurrent merges of the same movie are not coordinated here; the last
//! write wins. Two merges naming the same unknown studio may both create it.

mod validate;

pub use validate::{finite_integer, image_reference, valid_rating, valid_timestamp, MAX_RATING};

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::PluginsConfig;
use crate::extractor::{ExtractError, Extractor};
use crate::metrics;
use crate::plugin::{
    ImageCapabilities, PluginError, PluginHost, PluginInput, PluginResult, PluginValue,
};
use crate::store::{EntityStore, Movie, SearchIndexer, StoreError, Studio};

/// Errors that abort a merge.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("Extraction failed: {0}")]
    Extract(#[from] ExtractError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Plugin error: {0}")]
    Plugin(#[from] PluginError),
}

/// Applies plugin results to movies.
pub struct MovieEnricher {
    extractor: Extractor,
    store: Arc<dyn EntityStore>,
    indexer: Arc<dyn SearchIndexer>,
    config: PluginsConfig,
    plugin_host: Option<Arc<dyn PluginHost>>,
    capabilities: Option<Arc<dyn ImageCapabilities>>,
}

impl MovieEnricher {
    pub fn new(
        extractor: Extractor,
        store: Arc<dyn EntityStore>,
        indexer: Arc<dyn SearchIndexer>,
        config: PluginsConfig,
    ) -> Self {
        Self {
            extractor,
            store,
            indexer,
            config,
            plugin_host: None,
            capabilities: None,
        }
    }

    /// Attach the plugin host used by [`MovieEnricher::on_movie_create`].
    pub fn with_plugin_host(
        mut self,
        host: Arc<dyn PluginHost>,
        capabilities: Arc<dyn ImageCapabilities>,
    ) -> Self {
        self.plugin_host = Some(host);
        self.capabilities = Some(capabilities);
        self
    }

    /// Run the plugins registered for `event` on a movie and merge their result.
    ///
    /// Without a plugin host the movie is returned unchanged.
    pub async fn on_movie_create(&self, movie: Movie, event: &str) -> Result<Movie, MergeError> {
        let (Some(host), Some(capabilities)) = (&self.plugin_host, &self.capabilities) else {
            debug!("No plugin host configured, skipping {} for {}", event, movie.id);
            return Ok(movie);
        };

        let input = PluginInput::for_movie(&movie);
        let result = host.run(event, input, Arc::clone(capabilities)).await?;
        self.merge_plugin_result(movie, &result).await
    }

    /// Merge `result` into `movie` and return the updated movie.
    pub async fn merge_plugin_result(
        &self,
        mut movie: Movie,
        result: &PluginResult,
    ) -> Result<Movie, MergeError> {
        self.merge_covers(&mut movie, result);
        Self::merge_scalars(&mut movie, result);
        self.merge_custom_fields(&mut movie, result).await?;
        self.merge_studio(&mut movie, result).await?;
        Ok(movie)
    }

    fn merge_covers(&self, movie: &mut Movie, result: &PluginResult) {
        let allow_overwrite = self.config.allow_movie_thumbnail_overwrite;
        for (field, slot) in [
            ("frontCover", &mut movie.front_cover),
            ("backCover", &mut movie.back_cover),
            ("spineCover", &mut movie.spine_cover),
        ] {
            let Some(value) = result.get(field) else {
                continue;
            };
            let Some(image_id) = image_reference(value) else {
                rejected(field, value, "not an image id");
                continue;
            };

            let occupied = slot.as_deref().is_some_and(|id| !id.is_empty());
            if occupied && !allow_overwrite {
                rejected(field, value, "cover already set");
                continue;
            }

            *slot = Some(image_id.to_string());
            accepted(field);
        }
    }

    fn merge_scalars(movie: &mut Movie, result: &PluginResult) {
        if let Some(value) = result.get("name") {
            match value.as_str() {
                Some(name) => {
                    movie.name = name.to_string();
                    accepted("name");
                }
                None => rejected("name", value, "expected string"),
            }
        }

        if let Some(value) = result.get("description") {
            match value.as_str() {
                Some(description) => {
                    movie.description = Some(description.to_string());
                    accepted("description");
                }
                None => rejected("description", value, "expected string"),
            }
        }

        if let Some(value) = result.get("releaseDate") {
            match valid_timestamp(value) {
                Some(release_date) => {
                    movie.release_date = Some(release_date);
                    accepted("releaseDate");
                }
                None => rejected("releaseDate", value, "expected timestamp"),
            }
        }

        if let Some(value) = result.get("rating") {
            match valid_rating(value) {
                Some(rating) => {
                    movie.rating = rating;
                    accepted("rating");
                }
                None => rejected("rating", value, "expected whole number 0-10"),
            }
        }

        if let Some(value) = result.get("favorite") {
            match value.as_bool() {
                Some(favorite) => {
                    movie.favorite = favorite;
                    accepted("favorite");
                }
                None => rejected("favorite", value, "expected bool"),
            }
        }

        if let Some(value) = result.get("bookmark") {
            match finite_integer(value) {
                Some(bookmark) => {
                    movie.bookmark = Some(bookmark);
                    accepted("bookmark");
                }
                None => rejected("bookmark", value, "expected number"),
            }
        }
    }

    async fn merge_custom_fields(
        &self,
        movie: &mut Movie,
        result: &PluginResult,
    ) -> Result<(), MergeError> {
        let Some(value) = result.get("custom") else {
            return Ok(());
        };
        let Some(custom) = value.as_object() else {
            rejected("custom", value, "expected object");
            return Ok(());
        };

        for (key, field_value) in custom {
            let field_ids = self.extractor.extract_fields(key).await?;
            match field_ids.into_iter().next() {
                Some(field_id) => {
                    debug!("Custom field {:?} resolved to {}", key, field_id);
                    movie.custom_fields.insert(field_id, field_value.clone());
                    accepted("custom");
                }
                None => rejected("custom", field_value, "unknown custom field"),
            }
        }
        Ok(())
    }

    async fn merge_studio(&self, movie: &mut Movie, result: &PluginResult) -> Result<(), MergeError> {
        if movie.studio.as_deref().is_some_and(|id| !id.is_empty()) {
            return Ok(());
        }
        let Some(value) = result.get("studio") else {
            return Ok(());
        };
        let Some(name) = value.as_str().filter(|name| !name.is_empty()) else {
            rejected("studio", value, "expected non-empty string");
            return Ok(());
        };

        if let Some(studio_id) = self.extractor.extract_studios(name).await?.into_iter().next() {
            movie.studio = Some(studio_id);
            accepted("studio");
            return Ok(());
        }

        if !self.config.create_missing_studios {
            rejected("studio", value, "no matching studio");
            return Ok(());
        }

        let studio = Studio::new(name);
        self.store.upsert_studio(&studio).await?;
        self.indexer.index_studios(std::slice::from_ref(&studio)).await?;
        info!("Created studio {}", studio.name);
        metrics::STUDIOS_CREATED.inc();

        movie.studio = Some(studio.id);
        accepted("studio");
        Ok(())
    }
}

fn accepted(field: &str) {
    metrics::PLUGIN_FIELDS
        .with_label_values(&[field, "accepted"])
        .inc();
}

fn rejected(field: &str, value: &PluginValue, reason: &str) {
    debug!("Ignoring plugin field {} ({}): {}", field, value.type_name(), reason);
    metrics::PLUGIN_FIELDS
        .with_label_values(&[field, "rejected"])
        .inc();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{CatalogEntry, EntityKind};
    use crate::testing::{MockCatalogProvider, MockEntityStore, MockSearchIndexer};
    use indexmap::IndexMap;

    struct Harness {
        catalogs: Arc<MockCatalogProvider>,
        store: Arc<MockEntityStore>,
        indexer: Arc<MockSearchIndexer>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                catalogs: Arc::new(MockCatalogProvider::new()),
                store: Arc::new(MockEntityStore::new()),
                indexer: Arc::new(MockSearchIndexer::new()),
            }
        }

        fn enricher(&self, config: PluginsConfig) -> MovieEnricher {
            MovieEnricher::new(
                Extractor::new(self.catalogs.clone()),
                self.store.clone(),
                self.indexer.clone(),
                config,
            )
        }
    }

    fn movie() -> Movie {
        Movie::new("mo_1", "Night Drive")
    }

    fn allow_overwrite() -> PluginsConfig {
        PluginsConfig {
            allow_movie_thumbnail_overwrite: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_cover_into_empty_slot() {
        let h = Harness::new();
        let result = PluginResult::new().with("frontCover", "im_abc123");

        let merged = h
            .enricher(PluginsConfig::default())
            .merge_plugin_result(movie(), &result)
            .await
            .unwrap();
        assert_eq!(merged.front_cover.as_deref(), Some("im_abc123"));
    }

    #[tokio::test]
    async fn test_cover_kept_without_overwrite_flag() {
        let h = Harness::new();
        let mut existing = movie();
        existing.front_cover = Some("im_existing".to_string());
        let result = PluginResult::new().with("frontCover", "im_new");

        let merged = h
            .enricher(PluginsConfig::default())
            .merge_plugin_result(existing, &result)
            .await
            .unwrap();
        assert_eq!(merged.front_cover.as_deref(), Some("im_existing"));
    }

    #[tokio::test]
    async fn test_cover_overwritten_with_flag() {
        let h = Harness::new();
        let mut existing = movie();
        existing.back_cover = Some("im_existing".to_string());
        let result = PluginResult::new().with("backCover", "im_new");

        let merged = h
            .enricher(allow_overwrite())
            .merge_plugin_result(existing, &result)
            .await
            .unwrap();
        assert_eq!(merged.back_cover.as_deref(), Some("im_new"));
    }

    #[tokio::test]
    async fn test_cover_requires_image_id() {
        let h = Harness::new();
        let result = PluginResult::new()
            .with("frontCover", "https://cdn.example.com/front.jpg")
            .with("spineCover", 12.0);

        let merged = h
            .enricher(allow_overwrite())
            .merge_plugin_result(movie(), &result)
            .await
            .unwrap();
        assert_eq!(merged.front_cover, None);
        assert_eq!(merged.spine_cover, None);
    }

    #[tokio::test]
    async fn test_empty_cover_counts_as_unset() {
        let h = Harness::new();
        let mut existing = movie();
        existing.spine_cover = Some(String::new());
        let result = PluginResult::new().with("spineCover", "im_spine");

        let merged = h
            .enricher(PluginsConfig::default())
            .merge_plugin_result(existing, &result)
            .await
            .unwrap();
        assert_eq!(merged.spine_cover.as_deref(), Some("im_spine"));
    }

    #[tokio::test]
    async fn test_scalars_overwrite() {
        let h = Harness::new();
        let mut existing = movie();
        existing.rating = 3;
        existing.description = Some("old".to_string());

        let result = PluginResult::new()
            .with("name", "Night Drive II")
            .with("description", "A sequel.")
            .with("releaseDate", 1_577_836_800_000.0)
            .with("rating", 8.0)
            .with("favorite", true)
            .with("bookmark", 1_600_000_000_000.0);

        let merged = h
            .enricher(PluginsConfig::default())
            .merge_plugin_result(existing, &result)
            .await
            .unwrap();
        assert_eq!(merged.name, "Night Drive II");
        assert_eq!(merged.description.as_deref(), Some("A sequel."));
        assert_eq!(merged.release_date, Some(1_577_836_800_000));
        assert_eq!(merged.rating, 8);
        assert!(merged.favorite);
        assert_eq!(merged.bookmark, Some(1_600_000_000_000));
    }

    #[tokio::test]
    async fn test_invalid_scalars_are_ignored() {
        let h = Harness::new();
        let mut existing = movie();
        existing.rating = 3;
        existing.favorite = true;
        existing.release_date = Some(1);

        let result = PluginResult::new()
            .with("name", 42.0)
            .with("rating", 11.0)
            .with("favorite", "yes")
            .with("releaseDate", "2020-01-01")
            .with("bookmark", PluginValue::Null);

        let merged = h
            .enricher(PluginsConfig::default())
            .merge_plugin_result(existing.clone(), &result)
            .await
            .unwrap();
        assert_eq!(merged, existing);
    }

    #[tokio::test]
    async fn test_custom_field_resolved_and_overwritten() {
        let h = Harness::new();
        h.catalogs
            .set_entries(
                EntityKind::CustomField,
                vec![CatalogEntry::new("cf_eye", "Eye Color")],
            )
            .await;
        let mut existing = movie();
        existing
            .custom_fields
            .insert("cf_eye".to_string(), PluginValue::from("Green"));

        let mut custom = IndexMap::new();
        custom.insert("Eye Color".to_string(), PluginValue::from("Blue"));
        custom.insert("Shoe Size".to_string(), PluginValue::Number(9.0));
        let result = PluginResult::new().with("custom", PluginValue::Object(custom));

        let merged = h
            .enricher(PluginsConfig::default())
            .merge_plugin_result(existing, &result)
            .await
            .unwrap();
        assert_eq!(merged.custom_fields.len(), 1);
        assert_eq!(
            merged.custom_fields.get("cf_eye"),
            Some(&PluginValue::from("Blue"))
        );
    }

    #[tokio::test]
    async fn test_custom_field_first_resolved_id_only() {
        let h = Harness::new();
        h.catalogs
            .set_entries(
                EntityKind::CustomField,
                vec![
                    CatalogEntry::new("cf_color", "Color"),
                    CatalogEntry::new("cf_eye", "Eye Color"),
                ],
            )
            .await;

        let mut custom = IndexMap::new();
        custom.insert("Eye Color".to_string(), PluginValue::from("Blue"));
        let result = PluginResult::new().with("custom", PluginValue::Object(custom));

        let merged = h
            .enricher(PluginsConfig::default())
            .merge_plugin_result(movie(), &result)
            .await
            .unwrap();
        assert_eq!(
            merged.custom_fields.keys().collect::<Vec<_>>(),
            vec!["cf_color"]
        );
    }

    #[tokio::test]
    async fn test_custom_keys_applied_in_plugin_order() {
        let h = Harness::new();
        h.catalogs
            .set_entries(
                EntityKind::CustomField,
                vec![
                    CatalogEntry::new("cf_color", "Color"),
                    CatalogEntry::new("cf_eye", "Eye Color"),
                ],
            )
            .await;

        // Both keys resolve to cf_color first; the later key wins.
        let result: PluginResult =
            serde_json::from_str(r#"{"custom": {"Eye Color": "Blue", "Color": "Red"}}"#).unwrap();

        let merged = h
            .enricher(PluginsConfig::default())
            .merge_plugin_result(movie(), &result)
            .await
            .unwrap();
        assert_eq!(merged.custom_fields.len(), 1);
        assert_eq!(
            merged.custom_fields.get("cf_color"),
            Some(&PluginValue::from("Red"))
        );

        let reversed: PluginResult =
            serde_json::from_str(r#"{"custom": {"Color": "Red", "Eye Color": "Blue"}}"#).unwrap();
        let merged = h
            .enricher(PluginsConfig::default())
            .merge_plugin_result(movie(), &reversed)
            .await
            .unwrap();
        assert_eq!(
            merged.custom_fields.get("cf_color"),
            Some(&PluginValue::from("Blue"))
        );
    }

    #[tokio::test]
    async fn test_custom_not_an_object_is_ignored() {
        let h = Harness::new();
        let result = PluginResult::new().with("custom", "Eye Color: Blue");

        let merged = h
            .enricher(PluginsConfig::default())
            .merge_plugin_result(movie(), &result)
            .await
            .unwrap();
        assert!(merged.custom_fields.is_empty());
        assert_eq!(h.catalogs.fetch_count(EntityKind::CustomField).await, 0);
    }

    #[tokio::test]
    async fn test_studio_matched() {
        let h = Harness::new();
        h.catalogs
            .set_entries(
                EntityKind::Studio,
                vec![
                    CatalogEntry::new("st_short", "Studio"),
                    CatalogEntry::new("st_long", "Studio Prime"),
                ],
            )
            .await;
        let result = PluginResult::new().with("studio", "Studio Prime");

        let merged = h
            .enricher(PluginsConfig::default())
            .merge_plugin_result(movie(), &result)
            .await
            .unwrap();
        assert_eq!(merged.studio.as_deref(), Some("st_long"));
        assert!(h.store.studios().await.is_empty());
    }

    #[tokio::test]
    async fn test_studio_created_when_missing() {
        let h = Harness::new();
        let config = PluginsConfig {
            create_missing_studios: true,
            ..Default::default()
        };
        let result = PluginResult::new().with("studio", "Unknown Films");

        let merged = h
            .enricher(config)
            .merge_plugin_result(movie(), &result)
            .await
            .unwrap();

        let studios = h.store.studios().await;
        assert_eq!(studios.len(), 1);
        assert_eq!(studios[0].name, "Unknown Films");
        assert_eq!(merged.studio.as_deref(), Some(studios[0].id.as_str()));
        assert_eq!(h.indexer.indexed_studios().await, vec![studios[0].id.clone()]);
    }

    #[tokio::test]
    async fn test_studio_left_unset_without_creation() {
        let h = Harness::new();
        let result = PluginResult::new().with("studio", "Unknown Films");

        let merged = h
            .enricher(PluginsConfig::default())
            .merge_plugin_result(movie(), &result)
            .await
            .unwrap();
        assert_eq!(merged.studio, None);
        assert!(h.store.studios().await.is_empty());
        assert!(h.indexer.indexed_studios().await.is_empty());
    }

    #[tokio::test]
    async fn test_existing_studio_not_replaced() {
        let h = Harness::new();
        let config = PluginsConfig {
            create_missing_studios: true,
            ..Default::default()
        };
        let mut existing = movie();
        existing.studio = Some("st_existing".to_string());
        let result = PluginResult::new().with("studio", "Unknown Films");

        let merged = h
            .enricher(config)
            .merge_plugin_result(existing, &result)
            .await
            .unwrap();
        assert_eq!(merged.studio.as_deref(), Some("st_existing"));
        assert_eq!(h.catalogs.fetch_count(EntityKind::Studio).await, 0);
    }

    #[tokio::test]
    async fn test_catalog_failure_aborts_merge() {
        let h = Harness::new();
        h.catalogs
            .set_next_error(StoreError::Unavailable("offline".to_string()))
            .await;
        let result = PluginResult::new().with("studio", "Unknown Films");

        let err = h
            .enricher(PluginsConfig::default())
            .merge_plugin_result(movie(), &result)
            .await
            .unwrap_err();
        assert!(matches!(err, MergeError::Extract(_)));
    }

    #[tokio::test]
    async fn test_store_failure_aborts_studio_creation() {
        let h = Harness::new();
        h.store
            .set_next_error(StoreError::Database("disk full".to_string()))
            .await;
        let config = PluginsConfig {
            create_missing_studios: true,
            ..Default::default()
        };
        let result = PluginResult::new().with("studio", "Unknown Films");

        let err = h
            .enricher(config)
            .merge_plugin_result(movie(), &result)
            .await
            .unwrap_err();
        assert!(matches!(err, MergeError::Store(StoreError::Database(_))));
        assert!(h.indexer.indexed_studios().await.is_empty());
    }

    #[tokio::test]
    async fn test_on_movie_create_without_host_is_noop() {
        let h = Harness::new();
        let original = movie();
        let merged = h
            .enricher(PluginsConfig::default())
            .on_movie_create(original.clone(), crate::plugin::MOVIE_CREATED_EVENT)
            .await
            .unwrap();
        assert_eq!(merged, original);
    }
}
