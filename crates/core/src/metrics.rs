//! Prometheus metrics for extraction and plugin merging.
//!
//! This module provides metrics for:
//! - Extraction (calls and matches per entity kind)
//! - Plugin merges (accepted/rejected fields, created studios)
//! - Plugin capabilities (created images)

use once_cell::sync::Lazy;
use prometheus::{IntCounter, IntCounterVec, Opts, Registry};

// =============================================================================
// Extraction
// =============================================================================

/// Extraction calls by entity kind.
pub static EXTRACTIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("marquee_extractions_total", "Total extraction calls"),
        &["kind"],
    )
    .unwrap()
});

/// Matched entities by entity kind.
pub static EXTRACTION_MATCHES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "marquee_extraction_matches_total",
            "Total catalog entries matched by extraction",
        ),
        &["kind"],
    )
    .unwrap()
});

// =============================================================================
// Plugin merging
// =============================================================================

/// Plugin fields seen during merges.
pub static PLUGIN_FIELDS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "marquee_plugin_fields_total",
            "Plugin result fields considered during merges",
        ),
        &["field", "outcome"], // outcome: "accepted", "rejected"
    )
    .unwrap()
});

/// Studios created because a plugin named an unknown one.
pub static STUDIOS_CREATED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "marquee_studios_created_total",
        "Studios created from plugin results",
    )
    .unwrap()
});

/// Images created through plugin capabilities.
pub static IMAGES_CREATED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "marquee_images_created_total",
            "Images created by plugins",
        ),
        &["source"], // "remote", "local"
    )
    .unwrap()
});

/// Register every metric with `registry`.
pub fn register_metrics(registry: &Registry) -> Result<(), prometheus::Error> {
    registry.register(Box::new(EXTRACTIONS.clone()))?;
    registry.register(Box::new(EXTRACTION_MATCHES.clone()))?;
    registry.register(Box::new(PLUGIN_FIELDS.clone()))?;
    registry.register(Box::new(STUDIOS_CREATED.clone()))?;
    registry.register(Box::new(IMAGES_CREATED.clone()))?;
    Ok(())
}
