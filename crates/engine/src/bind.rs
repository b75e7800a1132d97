//! Credentials embedded in request parameters by a serverless binding.

use serde_json::Value;
use svcreds_types::{CredentialMap, RequestParams};
use tracing::debug;

use crate::{APIKEY_FIELD, IAM_APIKEY_FIELD};

/// Reserved parameter holding the bound credential bundles, keyed by alias.
pub const BIND_CREDENTIALS_KEY: &str = "__bx_creds";

/// Returns a copy of `params` with the bound credentials merged in.
///
/// The bundle is looked up under `alt_name` first, then under `service`. Its
/// fields are merged over the remaining parameters with `apikey` renamed to
/// `iam_apikey`. The reserved key is always removed from the copy, even when
/// no bundle matches. `params` is left untouched.
pub fn extract_from_bind(params: &RequestParams, service: &str, alt_name: Option<&str>) -> RequestParams {
    let mut extracted = params.clone();
    let Some(bundles) = extracted.remove(BIND_CREDENTIALS_KEY) else {
        return extracted;
    };

    let mut aliases = alt_name.into_iter().chain(Some(service)).filter(|alias| !alias.trim().is_empty());
    let bound = aliases.find_map(|alias| match bundles.get(alias) {
        Some(Value::Object(fields)) => Some((alias, fields.clone())),
        _ => None,
    });

    match bound {
        Some((alias, fields)) => {
            let mut credentials = CredentialMap::from_object(fields);
            credentials.rename_key(APIKEY_FIELD, IAM_APIKEY_FIELD);
            debug!(alias, fields = credentials.len(), "Merged bound credentials into parameters");
            extracted.extend(credentials);
        }
        None => {
            debug!(service, "No bound credentials for service");
        }
    }
    extracted
}
