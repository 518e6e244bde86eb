//! Loosely-typed plugin output.
//!
//! Plugins are external code; nothing they return is trusted. Every value is
//! kept as a [`PluginValue`] and checked for type (and range, where the field
//! has one) before it is allowed anywhere near an entity.
//!
//! Objects keep the key order the plugin produced them in.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single value produced by a plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PluginValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<PluginValue>),
    Object(IndexMap<String, PluginValue>),
}

impl PluginValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PluginValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PluginValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PluginValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, PluginValue>> {
        match self {
            PluginValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Short type name for log lines.
    pub fn type_name(&self) -> &'static str {
        match self {
            PluginValue::Null => "null",
            PluginValue::Bool(_) => "bool",
            PluginValue::Number(_) => "number",
            PluginValue::String(_) => "string",
            PluginValue::Array(_) => "array",
            PluginValue::Object(_) => "object",
        }
    }
}

impl From<serde_json::Value> for PluginValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => PluginValue::Null,
            serde_json::Value::Bool(b) => PluginValue::Bool(b),
            // Integers beyond f64 precision round, same as any JSON consumer.
            serde_json::Value::Number(n) => n.as_f64().map_or(PluginValue::Null, PluginValue::Number),
            serde_json::Value::String(s) => PluginValue::String(s),
            serde_json::Value::Array(items) => {
                PluginValue::Array(items.into_iter().map(PluginValue::from).collect())
            }
            serde_json::Value::Object(map) => PluginValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, PluginValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for PluginValue {
    fn from(value: &str) -> Self {
        PluginValue::String(value.to_string())
    }
}

impl From<f64> for PluginValue {
    fn from(value: f64) -> Self {
        PluginValue::Number(value)
    }
}

impl From<bool> for PluginValue {
    fn from(value: bool) -> Self {
        PluginValue::Bool(value)
    }
}

/// The merged output of a plugin run: field name to value.
///
/// A missing key means the plugin supplied nothing for that field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginResult {
    fields: IndexMap<String, PluginValue>,
}

impl PluginResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy when assembling results by hand.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PluginValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PluginValue>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&PluginValue> {
        self.fields.get(key)
    }

    /// Field names in the order the plugin produced them.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Build a result from arbitrary JSON.
    ///
    /// Anything other than a JSON object yields an empty result.
    pub fn from_json(value: serde_json::Value) -> Self {
        match PluginValue::from(value) {
            PluginValue::Object(fields) => Self { fields },
            _ => Self::default(),
        }
    }
}

impl FromIterator<(String, PluginValue)> for PluginResult {
    fn from_iter<T: IntoIterator<Item = (String, PluginValue)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_mixed_values() {
        let result: PluginResult = serde_json::from_value(json!({
            "name": "Night Drive",
            "rating": 8,
            "favorite": true,
            "bookmark": null,
            "custom": {"Eye Color": "Blue"},
            "labels": ["a", "b"]
        }))
        .unwrap();

        assert_eq!(result.get("name").and_then(|v| v.as_str()), Some("Night Drive"));
        assert_eq!(result.get("rating").and_then(|v| v.as_f64()), Some(8.0));
        assert_eq!(result.get("favorite").and_then(|v| v.as_bool()), Some(true));
        assert_eq!(result.get("bookmark"), Some(&PluginValue::Null));
        assert!(result.get("custom").and_then(|v| v.as_object()).is_some());
        assert_eq!(result.get("labels").map(|v| v.type_name()), Some("array"));
        assert!(result.get("missing").is_none());
    }

    #[test]
    fn test_from_json_non_object_is_empty() {
        assert!(PluginResult::from_json(json!("just a string")).is_empty());
        assert!(PluginResult::from_json(json!([1, 2, 3])).is_empty());
        assert!(PluginResult::from_json(json!(null)).is_empty());
    }

    #[test]
    fn test_accessors_reject_other_types() {
        let value = PluginValue::from("8");
        assert_eq!(value.as_f64(), None);
        assert_eq!(value.as_bool(), None);
        assert_eq!(PluginValue::Number(1.0).as_str(), None);
    }

    #[test]
    fn test_object_keys_keep_plugin_order() {
        let result: PluginResult =
            serde_json::from_str(r#"{"custom": {"Eye Color": "Blue", "Color": "Red", "Age": 30}}"#)
                .unwrap();
        let custom = result.get("custom").and_then(|v| v.as_object()).unwrap();
        assert_eq!(
            custom.keys().collect::<Vec<_>>(),
            vec!["Eye Color", "Color", "Age"]
        );

        let from_value =
            PluginResult::from_json(serde_json::from_str(r#"{"zeta": 1, "alpha": 2}"#).unwrap());
        assert_eq!(from_value.keys().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_builder() {
        let result = PluginResult::new()
            .with("name", "Night Drive")
            .with("rating", 7.0)
            .with("favorite", false);
        assert_eq!(result.get("rating"), Some(&PluginValue::Number(7.0)));
        assert_eq!(result.get("favorite"), Some(&PluginValue::Bool(false)));
    }
}
