//! Snapshot and local-file models built at the process boundary.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use svcreds_types::{FlatConfigSource, ServiceCatalog};
use thiserror::Error;
use tracing::{debug, warn};

/// Environment variable holding the structured service catalog.
pub const CATALOG_ENV_VAR: &str = "VCAP_SERVICES";

/// Immutable view of every configuration source the resolver consults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvironmentSnapshot {
    pub catalog: ServiceCatalog,
    pub entries: FlatConfigSource,
}

impl EnvironmentSnapshot {
    pub fn new(catalog: ServiceCatalog, entries: FlatConfigSource) -> Self {
        Self { catalog, entries }
    }

    /// Builds a snapshot from raw `(name, value)` pairs.
    ///
    /// The [`CATALOG_ENV_VAR`] entry becomes the catalog and every other pair
    /// becomes a flat entry. A malformed catalog is logged and replaced by an
    /// empty one. Flat entries are ordered by key.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut catalog = ServiceCatalog::default();
        let mut entries = FlatConfigSource::default();

        for (key, value) in vars {
            let key = key.into();
            let value = value.into();
            if key == CATALOG_ENV_VAR {
                catalog = parse_catalog(&value);
            } else {
                entries.insert(key, value);
            }
        }
        entries.sort_keys();

        debug!(services = catalog.len(), entries = entries.len(), "Captured environment snapshot");
        Self { catalog, entries }
    }

    /// Captures the current process environment.
    pub fn from_process_env() -> Self {
        Self::from_vars(std::env::vars())
    }
}

fn parse_catalog(raw: &str) -> ServiceCatalog {
    if raw.trim().is_empty() {
        return ServiceCatalog::default();
    }
    match ServiceCatalog::from_json_str_lenient(raw) {
        Ok((catalog, skipped)) => {
            for entry in skipped {
                match entry.index {
                    Some(index) => warn!(service = %entry.service, index, "Catalog instance is malformed; skipping it"),
                    None => warn!(service = %entry.service, "Catalog service is not a list of instances; skipping it"),
                }
            }
            catalog
        }
        Err(error) => {
            warn!(variable = CATALOG_ENV_VAR, error = %error, "Service catalog is malformed; ignoring it");
            ServiceCatalog::default()
        }
    }
}

/// Flat key/value credentials read from a local file.
///
/// Keys follow `watson_<service>_<field>`, for example
/// `watson_conversation_username`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalConfig(IndexMap<String, Value>);

impl LocalConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for LocalConfig {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(key, value)| (key.into(), value.into())).collect())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read local credentials from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
