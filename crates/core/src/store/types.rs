//! Entity types shared by extraction, merging and storage.

use std::collections::BTreeMap;
use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::plugin::PluginValue;

/// Id prefix of image records.
pub const IMAGE_ID_PREFIX: &str = "im_";

/// Id prefix of studio records.
pub const STUDIO_ID_PREFIX: &str = "st_";

/// Generate a fresh entity id such as `st_4f1c...`.
pub fn generate_id(prefix: &str) -> String {
    format!("{}{}", prefix, Uuid::new_v4().simple())
}

/// Kinds of entity that can be extracted from text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Actor,
    Studio,
    Label,
    Scene,
    Movie,
    CustomField,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Actor,
        EntityKind::Studio,
        EntityKind::Label,
        EntityKind::Scene,
        EntityKind::Movie,
        EntityKind::CustomField,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Actor => "actor",
            EntityKind::Studio => "studio",
            EntityKind::Label => "label",
            EntityKind::Scene => "scene",
            EntityKind::Movie => "movie",
            EntityKind::CustomField => "custom_field",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A matchable catalog row: any entity with a name and optional aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    /// Alternate names. Actor aliases may be regular expressions.
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl CatalogEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            aliases: Vec::new(),
        }
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }
}

/// A studio record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Studio {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Creation time, milliseconds since the epoch.
    pub added_on: i64,
}

impl Studio {
    /// A brand-new studio with a generated id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: generate_id(STUDIO_ID_PREFIX),
            name: name.into(),
            aliases: Vec::new(),
            added_on: Utc::now().timestamp_millis(),
        }
    }
}

impl From<&Studio> for CatalogEntry {
    fn from(studio: &Studio) -> Self {
        CatalogEntry::new(studio.id.clone(), studio.name.clone())
            .with_aliases(studio.aliases.iter().cloned())
    }
}

/// An image record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub added_on: i64,
}

impl Image {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: generate_id(IMAGE_ID_PREFIX),
            name: name.into(),
            path: None,
            added_on: Utc::now().timestamp_millis(),
        }
    }
}

/// A movie: the entity plugin results are merged into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Release date, milliseconds since the epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<i64>,
    /// 0 means unrated.
    #[serde(default)]
    pub rating: u8,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookmark: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front_cover: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_cover: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spine_cover: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub studio: Option<String>,
    /// Custom field values keyed by custom field id.
    #[serde(default)]
    pub custom_fields: BTreeMap<String, PluginValue>,
    #[serde(default)]
    pub added_on: i64,
}

impl Movie {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            release_date: None,
            rating: 0,
            favorite: false,
            bookmark: None,
            front_cover: None,
            back_cover: None,
            spine_cover: None,
            studio: None,
            custom_fields: BTreeMap::new(),
            added_on: Utc::now().timestamp_millis(),
        }
    }
}
