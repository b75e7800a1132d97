//! Loose-name matching over individually named configuration entries.

use serde_json::Value;
use svcreds_types::{CredentialMap, FlatConfigSource, Lookup};
use svcreds_util::{is_discriminator, is_environment_style_key, normalize_name};
use tracing::{debug, warn};

/// How a configuration key relates to the requested target, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Candidate {
    /// Same name after normalization.
    Exact,
    /// The key extends the target: `cloudant_nosql` → `CLOUDANT_NOSQL_DB_X5`.
    ExtendsTarget,
    /// The target is the key plus one discriminator: `conversation_w1` → `CONVERSATION`.
    Discriminated,
}

/// Resolves `target` against a flat configuration source.
///
/// Only keys written in the environment convention (no lowercase letters) are
/// considered, and leading or trailing separators are ignored on both sides.
/// An exact normalized match wins; otherwise the earliest key that extends
/// the target, then the earliest key the target extends by a single
/// discriminator token. The selected entry must hold a JSON object. When it
/// does not, the lookup fails without trying another candidate.
pub fn resolve_from_flat_source(source: &FlatConfigSource, target: &str) -> Lookup {
    let normalized = normalize_name(target);
    let target = normalized.trim_matches('_');
    if target.is_empty() {
        return Lookup::NotFound;
    }

    let Some(key) = select_candidate(source, target) else {
        debug!(requested = %target, "No configuration entry matches target");
        return Lookup::NotFound;
    };
    debug!(requested = %target, key, "Selected configuration entry");

    source.get(key).and_then(|raw| parse_object(key, raw)).into()
}

fn select_candidate<'a>(source: &'a FlatConfigSource, target: &str) -> Option<&'a str> {
    let mut extends_target = None;
    let mut discriminated = None;

    for key in source.keys().filter(|key| is_environment_style_key(key)) {
        match classify(normalize_name(key).trim_matches('_'), target) {
            Some(Candidate::Exact) => return Some(key),
            Some(Candidate::ExtendsTarget) => {
                extends_target.get_or_insert(key);
            }
            Some(Candidate::Discriminated) => {
                discriminated.get_or_insert(key);
            }
            None => {}
        }
    }

    extends_target.or(discriminated)
}

fn classify(normalized_key: &str, target: &str) -> Option<Candidate> {
    if normalized_key == target {
        return Some(Candidate::Exact);
    }
    if let Some(rest) = normalized_key.strip_prefix(target)
        && rest.len() > 1
        && rest.starts_with('_')
    {
        return Some(Candidate::ExtendsTarget);
    }
    if let Some(rest) = target.strip_prefix(normalized_key)
        && let Some(token) = rest.strip_prefix('_')
        && is_discriminator(token)
    {
        return Some(Candidate::Discriminated);
    }
    None
}

/// Parses a raw configuration value, accepting only JSON objects.
///
/// Malformed values are logged by key and treated as absent.
pub(crate) fn parse_object(key: &str, raw: &str) -> Option<CredentialMap> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(object)) => Some(CredentialMap::from_object(object)),
        Ok(_) => {
            warn!(key, "Configuration entry is not a JSON object; ignoring it");
            None
        }
        Err(error) => {
            warn!(key, error = %error, "Configuration entry is not valid JSON; ignoring it");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn source() -> FlatConfigSource {
        [
            ("CLOUDANT_NOSQL_DB_X5", json!({"name": "Cloudant NoSQL DB-x5"}).to_string()),
            ("CLOUDANT_NOSQL_DB_X6", json!({"name": "Cloudant NoSQL DB-x6"}).to_string()),
            ("COMPOSE_FOR_REDIS_OV", json!({"name": "Compose for Redis-ov"}).to_string()),
            ("CONVERSATION", json!({"username": "conversation"}).to_string()),
            ("OBJECT_STORAGE_6J", "Not JSON".to_string()),
            ("PORT", "8080".to_string()),
            ("weather_company_data_wu", json!({"name": "weather-company_data_wu"}).to_string()),
        ]
        .into_iter()
        .collect()
    }

    fn name_of(lookup: Lookup) -> Option<String> {
        match lookup {
            Lookup::Found(credentials) => credentials.get_str("name").map(str::to_string),
            Lookup::NotFound => None,
        }
    }

    #[test]
    fn exact_match_after_normalization() {
        for target in ["COMPOSE_FOR_REDIS_OV", "Compose-for-Redis-ov", "Compose for redis ov", "Compose&for&redis-ov"] {
            assert_eq!(name_of(resolve_from_flat_source(&source(), target)).as_deref(), Some("Compose for Redis-ov"));
        }
    }

    #[test]
    fn surrounding_separators_are_ignored() {
        for target in ["Compose for redis ov ", " Compose-for-Redis-ov", "_compose_for_redis_ov-"] {
            assert_eq!(name_of(resolve_from_flat_source(&source(), target)).as_deref(), Some("Compose for Redis-ov"));
        }
    }

    #[test]
    fn discriminator_selects_specific_instance() {
        let x5 = name_of(resolve_from_flat_source(&source(), "cloudant_nosql_db_x5"));
        let x6 = name_of(resolve_from_flat_source(&source(), "cloudant_nosql_db_x6"));
        assert_eq!(x5.as_deref(), Some("Cloudant NoSQL DB-x5"));
        assert_eq!(x6.as_deref(), Some("Cloudant NoSQL DB-x6"));
    }

    #[test]
    fn base_name_selects_earliest_extension() {
        assert_eq!(
            name_of(resolve_from_flat_source(&source(), "cloudant_nosql")).as_deref(),
            Some("Cloudant NoSQL DB-x5")
        );
    }

    #[test]
    fn unrelated_suffix_does_not_match() {
        assert_eq!(resolve_from_flat_source(&source(), "cloudant_nosql_xx"), Lookup::NotFound);
    }

    #[test]
    fn target_with_discriminator_falls_back_to_base_key() {
        let lookup = resolve_from_flat_source(&source(), "conversation_w1");
        assert_eq!(lookup, Lookup::Found(serde_json::from_value(json!({"username": "conversation"})).unwrap()));
    }

    #[test]
    fn lowercase_keys_are_ignored() {
        assert_eq!(resolve_from_flat_source(&source(), "weather_company_data_wu"), Lookup::NotFound);
        assert_eq!(resolve_from_flat_source(&source(), "weather_company_data"), Lookup::NotFound);
    }

    #[test]
    fn malformed_selected_entry_voids_the_match() {
        assert_eq!(resolve_from_flat_source(&source(), "OBJECT_STORAGE"), Lookup::NotFound);
        assert_eq!(resolve_from_flat_source(&source(), "Object Storage-6j"), Lookup::NotFound);
    }

    #[test]
    fn non_object_json_is_absent() {
        assert_eq!(resolve_from_flat_source(&source(), "port"), Lookup::NotFound);
        assert_eq!(parse_object("PORT", "8080"), None);
    }

    #[test]
    fn blank_target_matches_nothing() {
        assert_eq!(resolve_from_flat_source(&source(), ""), Lookup::NotFound);
        assert_eq!(resolve_from_flat_source(&source(), " - "), Lookup::NotFound);
    }
}
