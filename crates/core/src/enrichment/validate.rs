//! Type and range checks applied to plugin values before they are merged.

use chrono::DateTime;

use crate::plugin::PluginValue;
use crate::store::IMAGE_ID_PREFIX;

/// Highest rating a movie can carry. 0 means unrated.
pub const MAX_RATING: u8 = 10;

/// Largest timestamp magnitude (ms) a date may have, +/- 100,000,000 days.
const MAX_TIMESTAMP_MS: f64 = 8.64e15;

/// An image id produced by a plugin capability during the same run.
pub fn image_reference(value: &PluginValue) -> Option<&str> {
    value
        .as_str()
        .filter(|id| id.starts_with(IMAGE_ID_PREFIX))
}

/// A whole number in `0..=MAX_RATING`.
pub fn valid_rating(value: &PluginValue) -> Option<u8> {
    let n = value.as_f64()?;
    if n.fract() == 0.0 && (0.0..=f64::from(MAX_RATING)).contains(&n) {
        Some(n as u8)
    } else {
        None
    }
}

/// A millisecond timestamp, truncated towards zero.
pub fn valid_timestamp(value: &PluginValue) -> Option<i64> {
    let n = value.as_f64()?;
    if !n.is_finite() || n.abs() > MAX_TIMESTAMP_MS {
        return None;
    }
    DateTime::from_timestamp_millis(n.trunc() as i64).map(|dt| dt.timestamp_millis())
}

/// Any finite number, truncated to an integer.
pub fn finite_integer(value: &PluginValue) -> Option<i64> {
    value
        .as_f64()
        .filter(|n| n.is_finite())
        .map(|n| n.trunc() as i64)
}
