//! Ordered key/value state carried between screens.
//!
//! The calling client round-trips the whole form state in every request.
//! The dispatcher extracts the keys it knows, writes the keys a transition
//! defines, and every other entry passes through untouched in its original
//! position.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Screen state bag.
///
/// `null` or a missing `data` field deserializes to an empty bag.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DataBag(IndexMap<String, Value>);

impl DataBag {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Read a key as text.
    ///
    /// Strings are returned as-is and numbers in their decimal form; any
    /// other value (including `null`) reads as absent.
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.0.get(key).and_then(value_as_string)
    }

    /// Like [`get_string`](Self::get_string), treating blank text as absent.
    pub fn get_non_empty(&self, key: &str) -> Option<String> {
        self.get_string(key).filter(|s| !s.trim().is_empty())
    }

    /// Insert or overwrite. An existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Remove a key, closing the gap without reordering the rest.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    /// Remove a key and read it as non-blank text.
    pub fn take_non_empty(&mut self, key: &str) -> Option<String> {
        self.remove(key)
            .as_ref()
            .and_then(value_as_string)
            .filter(|s| !s.trim().is_empty())
    }

    /// Move the value under `from` to `to`.
    ///
    /// Returns `false` (and changes nothing) when `from` is absent.
    pub fn rename(&mut self, from: &str, to: &str) -> bool {
        match self.remove(from) {
            Some(value) => {
                self.insert(to, value);
                true
            }
            None => false,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> IndexMap<String, Value> {
        self.0
    }
}

fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl<'de> Deserialize<'de> for DataBag {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map = Option::<IndexMap<String, Value>>::deserialize(deserializer)?;
        Ok(Self(map.unwrap_or_default()))
    }
}

impl From<IndexMap<String, Value>> for DataBag {
    fn from(map: IndexMap<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for DataBag {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
