//! Extraction - finding known entities mentioned in free-form text.
//!
//! Text such as a filename or a plugin-supplied string is normalized and
//! compared against the full catalog of one entity kind, fetched fresh from
//! the [`CatalogProvider`] on every call.
//!
//! # Ordering
//!
//! Studios, scenes and movies come back longest name first, so that when
//! `"Studio"` and `"Studio Prime"` both match, callers taking the first id
//! get the more specific one. Actors, labels and custom fields come back in
//! catalog order and should be treated as an unordered candidate set.
//!
//! # Example
//!
//! ```ignore
//! use marquee_core::extractor::Extractor;
//!
//! let extractor = Extractor::new(library.clone());
//! let studio_ids = extractor.extract_studios("a Studio Prime release").await?;
//! ```

mod aliases;
mod matcher;
mod normalize;

pub use aliases::{filter_aliases, is_multi_word, is_plain_single_token};
pub use matcher::{is_matching_actor, is_matching_name, is_matching_name_or_alias, match_entries};
pub use normalize::normalize;

use std::cmp::Reverse;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::metrics;
use crate::store::{CatalogEntry, CatalogProvider, EntityKind, StoreError};

/// Errors that can occur during extraction.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The catalog could not be fetched; no partial result is available.
    #[error("Catalog unavailable for {kind}: {source}")]
    CatalogUnavailable {
        kind: EntityKind,
        #[source]
        source: StoreError,
    },
}

/// Matched ids for every entity kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractedEntities {
    pub actors: Vec<String>,
    pub studios: Vec<String>,
    pub labels: Vec<String>,
    pub scenes: Vec<String>,
    pub movies: Vec<String>,
    pub fields: Vec<String>,
}

/// Extracts entity ids from text against live catalogs.
#[derive(Clone)]
pub struct Extractor {
    catalogs: Arc<dyn CatalogProvider>,
}

impl Extractor {
    pub fn new(catalogs: Arc<dyn CatalogProvider>) -> Self {
        Self { catalogs }
    }

    /// Ids of every `kind` entry mentioned in `text`.
    pub async fn extract(&self, kind: EntityKind, text: &str) -> Result<Vec<String>, ExtractError> {
        metrics::EXTRACTIONS.with_label_values(&[kind.as_str()]).inc();

        let catalog = self
            .catalogs
            .get_all(kind)
            .await
            .map_err(|source| ExtractError::CatalogUnavailable { kind, source })?;

        let mut found = match_entries(kind, text, &catalog);
        if ranks_by_length(kind) {
            sort_longest_name_first(&mut found);
        }

        debug!(
            "Extracted {} {} match(es) from {:?} ({} in catalog)",
            found.len(),
            kind,
            text,
            catalog.len()
        );
        metrics::EXTRACTION_MATCHES
            .with_label_values(&[kind.as_str()])
            .inc_by(found.len() as u64);

        Ok(found.into_iter().map(|entry| entry.id.clone()).collect())
    }

    pub async fn extract_actors(&self, text: &str) -> Result<Vec<String>, ExtractError> {
        self.extract(EntityKind::Actor, text).await
    }

    pub async fn extract_studios(&self, text: &str) -> Result<Vec<String>, ExtractError> {
        self.extract(EntityKind::Studio, text).await
    }

    pub async fn extract_labels(&self, text: &str) -> Result<Vec<String>, ExtractError> {
        self.extract(EntityKind::Label, text).await
    }

    pub async fn extract_scenes(&self, text: &str) -> Result<Vec<String>, ExtractError> {
        self.extract(EntityKind::Scene, text).await
    }

    pub async fn extract_movies(&self, text: &str) -> Result<Vec<String>, ExtractError> {
        self.extract(EntityKind::Movie, text).await
    }

    /// Ids of custom fields whose name appears in `text`.
    pub async fn extract_fields(&self, text: &str) -> Result<Vec<String>, ExtractError> {
        self.extract(EntityKind::CustomField, text).await
    }

    /// Run every extraction, one kind after another.
    pub async fn extract_all(&self, text: &str) -> Result<ExtractedEntities, ExtractError> {
        Ok(ExtractedEntities {
            actors: self.extract_actors(text).await?,
            studios: self.extract_studios(text).await?,
            labels: self.extract_labels(text).await?,
            scenes: self.extract_scenes(text).await?,
            movies: self.extract_movies(text).await?,
            fields: self.extract_fields(text).await?,
        })
    }
}

fn ranks_by_length(kind: EntityKind) -> bool {
    matches!(kind, EntityKind::Studio | EntityKind::Scene | EntityKind::Movie)
}

/// Stable: equal lengths keep catalog order.
fn sort_longest_name_first(entries: &mut [&CatalogEntry]) {
    entries.sort_by_key(|entry| Reverse(entry.name.chars().count()));
}
