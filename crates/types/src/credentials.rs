//! Credential maps, request parameters and the internal lookup result.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field-name to value mapping returned by every credential lookup.
///
/// An empty map is the public "nothing found" signal. It cannot be told apart
/// from an instance whose credentials are intentionally empty; see [`Lookup`]
/// for the internal form that keeps the two cases apart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialMap(IndexMap<String, Value>);

impl CredentialMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the value for `key` when it is a JSON string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Moves the value stored under `from` to `to`, keeping its position.
    ///
    /// After the call `from` is gone; a value already present under `to` is
    /// replaced. Does nothing when `from` is absent.
    pub fn rename_key(&mut self, from: &str, to: &str) {
        let Some((index, _, value)) = self.0.shift_remove_full(from) else {
            return;
        };
        let mut position = index;
        if let Some((existing, _, _)) = self.0.shift_remove_full(to)
            && existing < index
        {
            position -= 1;
        }
        self.0.shift_insert(position, to.to_string(), value);
    }

    /// Builds a map from a parsed JSON object, keeping field order.
    pub fn from_object(object: serde_json::Map<String, Value>) -> Self {
        object.into_iter().collect()
    }

    /// Converts the map back into a JSON object value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0.into_iter().collect())
    }
}

impl FromIterator<(String, Value)> for CredentialMap {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for CredentialMap {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a CredentialMap {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Arbitrary request parameters, optionally embedding a bind credential bundle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestParams(IndexMap<String, Value>);

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Removes `key` while preserving the order of the remaining parameters.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.0.iter()
    }

    /// Builds parameters from a parsed JSON object, keeping field order.
    pub fn from_object(object: serde_json::Map<String, Value>) -> Self {
        object.into_iter().collect()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0.into_iter().collect())
    }
}

impl FromIterator<(String, Value)> for RequestParams {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<(String, Value)> for RequestParams {
    fn extend<T: IntoIterator<Item = (String, Value)>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

/// Outcome of a single resolution strategy.
///
/// Strategies report `NotFound` so the caller can move on to the next source;
/// the public API collapses the result to a [`CredentialMap`] with
/// [`Lookup::into_credentials`].
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Lookup {
    Found(CredentialMap),
    #[default]
    NotFound,
}

impl Lookup {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    /// Runs `fallback` only when nothing was found.
    pub fn or_else(self, fallback: impl FnOnce() -> Lookup) -> Lookup {
        match self {
            Lookup::Found(credentials) => Lookup::Found(credentials),
            Lookup::NotFound => fallback(),
        }
    }

    /// Collapses the result to the empty-map convention.
    pub fn into_credentials(self) -> CredentialMap {
        match self {
            Lookup::Found(credentials) => credentials,
            Lookup::NotFound => CredentialMap::new(),
        }
    }
}

impl From<Option<CredentialMap>> for Lookup {
    fn from(value: Option<CredentialMap>) -> Self {
        value.map_or(Lookup::NotFound, Lookup::Found)
    }
}
