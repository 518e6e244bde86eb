//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of every collaborator trait,
//! allowing extraction and merging to be tested without a database, a
//! search index or real plugins.
//!
//! # Example
//!
//! ```rust,ignore
//! use marquee_core::testing::{fixtures, MockCatalogProvider, MockEntityStore, MockSearchIndexer};
//!
//! let catalogs = fixtures::sample_catalogs().await;
//! let store = MockEntityStore::new();
//! let indexer = MockSearchIndexer::new();
//!
//! // Build an Extractor / MovieEnricher over them...
//! ```

mod mock_catalog_provider;
mod mock_entity_store;
mod mock_plugin_host;

pub use mock_catalog_provider::MockCatalogProvider;
pub use mock_entity_store::{MockEntityStore, MockSearchIndexer};
pub use mock_plugin_host::{MockImageDownloader, MockPluginHost, RecordedPluginRun, ScriptedImage};

/// Test fixtures and helper functions.
pub mod fixtures {
    use super::MockCatalogProvider;
    use crate::store::{CatalogEntry, EntityKind, Movie};

    /// Create a test movie with no covers, studio or custom fields.
    pub fn movie(name: &str) -> Movie {
        Movie::new(format!("mo_{}", name.to_lowercase().replace(' ', "_")), name)
    }

    /// Create catalog entries from `(id, name)` pairs.
    pub fn entries(pairs: &[(&str, &str)]) -> Vec<CatalogEntry> {
        pairs
            .iter()
            .map(|(id, name)| CatalogEntry::new(*id, *name))
            .collect()
    }

    /// A small library covering every entity kind.
    ///
    /// - actors: "Max" (single word, `max\d+` alias), "Max Power" (`mp\d{3}` alias)
    /// - studios: "Studio", "Studio Prime" (alias "SP")
    /// - labels: "1080p", "Outdoor" (alias "al fresco")
    /// - scenes: "Night Drive", "Night"
    /// - movies: "Night Drive Collection"
    /// - custom fields: "Eye Color", "Hair Color"
    pub async fn sample_catalogs() -> MockCatalogProvider {
        let catalogs = MockCatalogProvider::new();
        catalogs
            .set_entries(
                EntityKind::Actor,
                vec![
                    CatalogEntry::new("ac_max", "Max").with_aliases(["max\\d+"]),
                    CatalogEntry::new("ac_max_power", "Max Power").with_aliases(["mp\\d{3}"]),
                ],
            )
            .await;
        catalogs
            .set_entries(
                EntityKind::Studio,
                vec![
                    CatalogEntry::new("st_studio", "Studio"),
                    CatalogEntry::new("st_studio_prime", "Studio Prime").with_aliases(["SP"]),
                ],
            )
            .await;
        catalogs
            .set_entries(
                EntityKind::Label,
                vec![
                    CatalogEntry::new("la_1080p", "1080p"),
                    CatalogEntry::new("la_outdoor", "Outdoor").with_aliases(["al fresco"]),
                ],
            )
            .await;
        catalogs
            .set_entries(
                EntityKind::Scene,
                entries(&[("sc_night_drive", "Night Drive"), ("sc_night", "Night")]),
            )
            .await;
        catalogs
            .set_entries(
                EntityKind::Movie,
                entries(&[("mo_collection", "Night Drive Collection")]),
            )
            .await;
        catalogs
            .set_entries(
                EntityKind::CustomField,
                entries(&[("cf_eye_color", "Eye Color"), ("cf_hair_color", "Hair Color")]),
            )
            .await;
        catalogs
    }
}
