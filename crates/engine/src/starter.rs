//! Starter-kit credential sources: the local credentials file and the
//! per-service JSON entry injected by container platforms.

use serde_json::Value;
use svcreds_types::{CredentialMap, FlatConfigSource, Lookup};
use svcreds_util::normalize_name;
use tracing::debug;

use crate::config::LocalConfig;
use crate::flat::parse_object;
use crate::{APIKEY_FIELD, IAM_APIKEY_FIELD};

/// Prefix token shared by local credential keys and starter entries.
pub const STARTER_PREFIX: &str = "watson";

/// Collects `watson_<service>_<field>` keys from a local credentials file.
///
/// Only string values are kept. `apikey` is renamed to `iam_apikey`; the
/// result is empty when nothing matches.
pub fn credentials_from_local_config(service: &str, config: &LocalConfig) -> CredentialMap {
    let service = normalize_name(service);
    if service.trim_matches('_').is_empty() {
        return CredentialMap::new();
    }
    let prefix = format!("{STARTER_PREFIX}_{service}_");

    let mut credentials: CredentialMap = config
        .iter()
        .filter_map(|(key, value)| {
            let field = key.strip_prefix(&prefix).filter(|field| !field.is_empty())?;
            match value {
                Value::String(_) => Some((field.to_string(), value.clone())),
                _ => {
                    debug!(key, "Skipping non-string local credential value");
                    None
                }
            }
        })
        .collect();
    credentials.rename_key(APIKEY_FIELD, IAM_APIKEY_FIELD);

    if !credentials.is_empty() {
        debug!(service = %service, fields = credentials.len(), "Resolved credentials from local file");
    }
    credentials
}

/// Name of the flat entry a container platform injects for `service`.
pub fn starter_entry_key(service: &str) -> String {
    format!("service_{STARTER_PREFIX}_{}", normalize_name(service))
}

/// Reads the `service_watson_<service>` entry as a JSON object.
///
/// `apikey` is renamed to `iam_apikey`; other fields are returned as-is.
pub fn credentials_from_starter_entry(entries: &FlatConfigSource, service: &str) -> Lookup {
    if normalize_name(service).trim_matches('_').is_empty() {
        return Lookup::NotFound;
    }
    let key = starter_entry_key(service);
    let Some(mut credentials) = entries.get(&key).and_then(|raw| parse_object(&key, raw)) else {
        return Lookup::NotFound;
    };
    credentials.rename_key(APIKEY_FIELD, IAM_APIKEY_FIELD);
    debug!(key = %key, "Resolved credentials from starter entry");
    Lookup::Found(credentials)
}
