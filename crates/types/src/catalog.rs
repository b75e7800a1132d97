//! Structured service catalog and flat configuration sources.

use indexmap::IndexMap;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::CredentialMap;
use crate::filter::InstanceField;

/// Service name to bound instances, in document order.
///
/// Iteration order matters: the positional resolver lets later instances win
/// while the filter-based finder stops at the first one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceCatalog(IndexMap<String, Vec<Instance>>);

impl ServiceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a catalog document such as the platform's `VCAP_SERVICES` value.
    ///
    /// Strict: one malformed instance fails the whole document. See
    /// [`ServiceCatalog::from_json_str_lenient`] for platform input.
    pub fn from_json_str(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Parses a catalog document, skipping entries that do not have the
    /// expected shape.
    ///
    /// A service whose value is not a list, or an instance that does not
    /// deserialize (a numeric `name`, non-string tags, `credentials` that are
    /// not an object), is left out and reported in the returned list. Only a
    /// document that is not a JSON object of services is an error.
    pub fn from_json_str_lenient(content: &str) -> Result<(Self, Vec<SkippedEntry>), serde_json::Error> {
        let raw: IndexMap<String, RawInstances> = serde_json::from_str(content)?;
        let mut catalog = Self::new();
        let mut skipped = Vec::new();

        for (service, entries) in raw {
            let RawInstances::List(entries) = entries else {
                skipped.push(SkippedEntry { service, index: None });
                continue;
            };
            let mut instances = Vec::with_capacity(entries.len());
            for (index, entry) in entries.into_iter().enumerate() {
                match entry {
                    RawInstance::Valid(instance) => instances.push(instance),
                    RawInstance::Malformed(_) => skipped.push(SkippedEntry {
                        service: service.clone(),
                        index: Some(index),
                    }),
                }
            }
            catalog.insert(service, instances);
        }
        Ok((catalog, skipped))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn insert(&mut self, service: impl Into<String>, instances: Vec<Instance>) -> Option<Vec<Instance>> {
        self.0.insert(service.into(), instances)
    }

    /// Instances bound under the exact service name.
    pub fn instances(&self, service: &str) -> Option<&[Instance]> {
        self.0.get(service).map(Vec::as_slice)
    }

    /// All services with their instances, in catalog order.
    pub fn services(&self) -> impl Iterator<Item = (&str, &[Instance])> {
        self.0.iter().map(|(name, instances)| (name.as_str(), instances.as_slice()))
    }
}

impl FromIterator<(String, Vec<Instance>)> for ServiceCatalog {
    fn from_iter<T: IntoIterator<Item = (String, Vec<Instance>)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A catalog entry left out by [`ServiceCatalog::from_json_str_lenient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub service: String,
    /// Position within the service's list; `None` when the service value
    /// itself was not a list.
    pub index: Option<usize>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawInstances {
    List(Vec<RawInstance>),
    Other(IgnoredAny),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawInstance {
    Valid(Instance),
    Malformed(IgnoredAny),
}

/// One bound occurrence of a service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,

    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Empty for instances that were never provisioned with credentials.
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "CredentialMap::is_empty")]
    pub credentials: CredentialMap,

    /// Any other field the platform attached to the instance.
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl Instance {
    pub fn has_credentials(&self) -> bool {
        !self.credentials.is_empty()
    }

    /// Looks up a field for filter comparison without reflection.
    pub fn field(&self, field: &InstanceField) -> Option<FieldRef<'_>> {
        match field {
            InstanceField::Name => self.name.as_deref().map(FieldRef::Text),
            InstanceField::Label => self.label.as_deref().map(FieldRef::Text),
            InstanceField::Plan => self.plan.as_deref().map(FieldRef::Text),
            InstanceField::Tags => Some(FieldRef::List(&self.tags)),
            InstanceField::Other(name) => self.extra.get(name).map(FieldRef::Json),
        }
    }
}

/// Borrowed view of an instance field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldRef<'a> {
    Text(&'a str),
    List(&'a [String]),
    Json(&'a Value),
}

impl FieldRef<'_> {
    /// Equality for scalar fields, containment for list-valued fields.
    ///
    /// An array `expected` against a list field requires every element to be
    /// present.
    pub fn matches(&self, expected: &Value) -> bool {
        match (self, expected) {
            (FieldRef::Text(actual), Value::String(expected)) => *actual == expected.as_str(),
            (FieldRef::Text(_), _) => false,
            (FieldRef::List(items), Value::String(expected)) => items.iter().any(|item| item == expected),
            (FieldRef::List(items), Value::Array(expected)) => expected
                .iter()
                .all(|wanted| wanted.as_str().is_some_and(|wanted| items.iter().any(|item| item == wanted))),
            (FieldRef::List(_), _) => false,
            (FieldRef::Json(Value::Array(items)), Value::Array(expected)) => {
                expected.iter().all(|wanted| items.contains(wanted))
            }
            (FieldRef::Json(Value::Array(items)), expected) => items.contains(expected),
            (FieldRef::Json(actual), expected) => *actual == expected,
        }
    }
}

/// Raw configuration key to raw text, as exposed by the hosting platform.
///
/// Values stay unparsed; the loose-name matcher parses only the entry it
/// selects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlatConfigSource(IndexMap<String, String>);

impl FlatConfigSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Orders entries by key so that "earliest entry" is stable.
    pub fn sort_keys(&mut self) {
        self.0.sort_keys();
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FlatConfigSource {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(key, value)| (key.into(), value.into())).collect())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
