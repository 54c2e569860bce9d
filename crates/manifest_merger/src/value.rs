//! Tagged value model shared by every merge component.
//!
//! Manifest sections are converted into [`ConfigValue`] once, at the boundary
//! with whatever produced them (usually a `serde_json::Value`). The merge
//! algorithms only ever match on the three explicit shapes:
//!
//! - **Scalar**: a string, boolean or number, or null
//! - **List**: an ordered sequence whose members have no meaningful key
//!   (the *flat part* of a container)
//! - **Map**: an insertion-ordered, string-keyed mapping
//!   (the *associative part* of a container)
//!
//! # Examples
//!
//! ```rust
//! use manifest_merger::ConfigValue;
//! use serde_json::json;
//!
//! let value = ConfigValue::from(json!({"psr-4": {"App\\": "src/"}, "files": ["a.php"]}));
//! assert!(value.is_container());
//! assert_eq!(value.as_map().map(|m| m.len()), Some(2));
//! ```

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::fmt;

#[cfg(test)]
#[path = "value_tests.rs"]
mod tests;

/// A non-null scalar leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    String(String),
    Bool(bool),
    Number(Number),
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::String(s) => f.write_str(s),
            ScalarValue::Bool(b) => write!(f, "{}", b),
            ScalarValue::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Any value found in one section of a manifest.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    /// A leaf value; `None` is an explicit null.
    Scalar(Option<ScalarValue>),
    /// Members compared as an unordered set when merging.
    List(Vec<ConfigValue>),
    /// String-keyed sub-trees merged key by key.
    Map(ConfigMap),
}

impl ConfigValue {
    /// The null scalar.
    pub fn null() -> Self {
        ConfigValue::Scalar(None)
    }

    /// A string scalar.
    pub fn string(value: impl Into<String>) -> Self {
        ConfigValue::Scalar(Some(ScalarValue::String(value.into())))
    }

    /// A list of string scalars.
    pub fn string_list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ConfigValue::List(values.into_iter().map(ConfigValue::string).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ConfigValue::Scalar(None))
    }

    /// Returns `true` for lists and maps.
    pub fn is_container(&self) -> bool {
        matches!(self, ConfigValue::List(_) | ConfigValue::Map(_))
    }

    /// Returns `true` for a list or map without members.
    pub fn is_empty_container(&self) -> bool {
        match self {
            ConfigValue::List(items) => items.is_empty(),
            ConfigValue::Map(map) => map.is_empty(),
            ConfigValue::Scalar(_) => false,
        }
    }

    /// Returns `true` when this value, used as a merge result, means
    /// "remove this key or section".
    pub fn is_removal(&self) -> bool {
        self.is_null() || self.is_empty_container()
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Scalar(Some(ScalarValue::String(s))) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ConfigMap> {
        match self {
            ConfigValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Members without a key. Empty for maps and scalars.
    pub fn flat_part(&self) -> &[ConfigValue] {
        match self {
            ConfigValue::List(items) => items,
            _ => &[],
        }
    }

    /// Keyed members, if this is a map.
    pub fn associative_part(&self) -> Option<&ConfigMap> {
        self.as_map()
    }
}

impl Default for ConfigValue {
    fn default() -> Self {
        ConfigValue::null()
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Scalar(None) => f.write_str("null"),
            ConfigValue::Scalar(Some(scalar)) => scalar.fmt(f),
            container => {
                let json = Value::from(container);
                write!(f, "{}", json)
            }
        }
    }
}

impl From<Value> for ConfigValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ConfigValue::Scalar(None),
            Value::Bool(b) => ConfigValue::Scalar(Some(ScalarValue::Bool(b))),
            Value::Number(n) => ConfigValue::Scalar(Some(ScalarValue::Number(n))),
            Value::String(s) => ConfigValue::Scalar(Some(ScalarValue::String(s))),
            Value::Array(items) => {
                ConfigValue::List(items.into_iter().map(ConfigValue::from).collect())
            }
            Value::Object(object) => ConfigValue::Map(ConfigMap::from(object)),
        }
    }
}

impl From<&ConfigValue> for Value {
    fn from(value: &ConfigValue) -> Self {
        match value {
            ConfigValue::Scalar(None) => Value::Null,
            ConfigValue::Scalar(Some(ScalarValue::Bool(b))) => Value::Bool(*b),
            ConfigValue::Scalar(Some(ScalarValue::Number(n))) => Value::Number(n.clone()),
            ConfigValue::Scalar(Some(ScalarValue::String(s))) => Value::String(s.clone()),
            ConfigValue::List(items) => Value::Array(items.iter().map(Value::from).collect()),
            ConfigValue::Map(map) => Value::Object(Map::from(map)),
        }
    }
}

impl Serialize for ConfigValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Value::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ConfigValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(ConfigValue::from)
    }
}

/// Insertion-ordered map with unique string keys.
///
/// Equality ignores key order: two maps are equal when they hold the same
/// keys with equal values.
#[derive(Debug, Clone, Default)]
pub struct ConfigMap {
    entries: Vec<(String, ConfigValue)>,
}

impl ConfigMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Sets `key`, replacing an existing value in place or appending a new
    /// entry at the end. Returns the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: ConfigValue) -> Option<ConfigValue> {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<ConfigValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PartialEq for ConfigMap {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key).is_some_and(|o| o == value))
    }
}

impl FromIterator<(String, ConfigValue)> for ConfigMap {
    fn from_iter<I: IntoIterator<Item = (String, ConfigValue)>>(iter: I) -> Self {
        let mut map = ConfigMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl IntoIterator for ConfigMap {
    type Item = (String, ConfigValue);
    type IntoIter = std::vec::IntoIter<(String, ConfigValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl From<Map<String, Value>> for ConfigMap {
    fn from(object: Map<String, Value>) -> Self {
        object
            .into_iter()
            .map(|(k, v)| (k, ConfigValue::from(v)))
            .collect()
    }
}

impl From<&ConfigMap> for Map<String, Value> {
    fn from(map: &ConfigMap) -> Self {
        map.iter()
            .map(|(k, v)| (k.to_string(), Value::from(v)))
            .collect()
    }
}

impl Serialize for ConfigMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Value::Object(Map::from(self)).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ConfigMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Object(object) => Ok(ConfigMap::from(object)),
            other => Err(de::Error::custom(format!(
                "expected a map of sections, found {}",
                other
            ))),
        }
    }
}
