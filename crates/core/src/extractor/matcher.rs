//! Per-kind catalog matching.
//!
//! All matching is substring containment on normalized text, with no
//! word-boundary requirement: a short name inside a longer unrelated word
//! still matches. Actor aliases are the one exception and match as
//! case-insensitive regular expressions.

use regex_lite::RegexBuilder;
use tracing::debug;

use super::aliases::{filter_aliases, is_multi_word};
use super::normalize::normalize;
use crate::store::{CatalogEntry, EntityKind};

/// Whether `actor` appears in already-normalized text.
///
/// Single-word actor names never match.
pub fn is_matching_actor(normalized_text: &str, actor: &CatalogEntry) -> bool {
    if !is_multi_word(&actor.name) {
        return false;
    }

    if normalized_text.contains(&normalize(&actor.name)) {
        return true;
    }

    filter_aliases(&actor.aliases)
        .into_iter()
        .any(|alias| match RegexBuilder::new(alias).case_insensitive(true).build() {
            Ok(pattern) => pattern.is_match(normalized_text),
            Err(e) => {
                debug!("Skipping invalid alias pattern {:?} for actor {}: {}", alias, actor.id, e);
                false
            }
        })
}

/// Whether the entry's name appears in already-normalized text.
pub fn is_matching_name(normalized_text: &str, entry: &CatalogEntry) -> bool {
    normalized_text.contains(&normalize(&entry.name))
}

/// Whether the entry's name or any of its aliases appears, literally.
pub fn is_matching_name_or_alias(normalized_text: &str, entry: &CatalogEntry) -> bool {
    is_matching_name(normalized_text, entry)
        || entry
            .aliases
            .iter()
            .any(|alias| normalized_text.contains(&normalize(alias)))
}

/// Every entry of `kind` in `catalog` that `text` refers to, in catalog order.
pub fn match_entries<'a>(
    kind: EntityKind,
    text: &str,
    catalog: &'a [CatalogEntry],
) -> Vec<&'a CatalogEntry> {
    let normalized = normalize(text);
    let matches: fn(&str, &CatalogEntry) -> bool = match kind {
        EntityKind::Actor => is_matching_actor,
        EntityKind::Studio | EntityKind::Label => is_matching_name_or_alias,
        EntityKind::Scene | EntityKind::Movie | EntityKind::CustomField => is_matching_name,
    };

    catalog
        .iter()
        .filter(|entry| matches(&normalized, entry))
        .collect()
}
