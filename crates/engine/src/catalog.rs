//! Catalog resolution over the structured service catalog.
//!
//! Two entry points search the same data with different tie-break rules:
//!
//! - [`resolve_from_catalog`] takes positional criteria and keeps the *last*
//!   credentialed instance that satisfies them, so the most recently bound
//!   instance wins.
//! - [`find_in_catalog`] takes a [`CredentialFilter`] and stops at the *first*
//!   credentialed instance that satisfies it, scanning services in catalog
//!   order.
//!
//! Instances without credentials never match either entry point.

use svcreds_types::{CredentialFilter, CredentialQuery, Instance, InstanceFilter, Lookup, NamePattern, ServiceCatalog};
use svcreds_util::normalize_name;
use tracing::debug;

/// Resolves credentials from positional criteria; the last match wins.
///
/// A literal service pattern selects the exact catalog key or any key whose
/// normalized form starts with the normalized pattern (`personality` selects
/// `personality_insights`). A regular expression is searched for anywhere in
/// the raw key. Without a service pattern every service is scanned.
pub fn resolve_from_catalog(catalog: &ServiceCatalog, query: &CredentialQuery) -> Lookup {
    let normalized_service = query.service.as_ref().and_then(NamePattern::as_literal).map(normalize_name);
    let mut last_match: Option<(&str, &Instance)> = None;

    for (service, instances) in catalog.services() {
        if let Some(pattern) = &query.service
            && !service_matches_prefix(pattern, normalized_service.as_deref(), service)
        {
            continue;
        }
        for instance in instances {
            if instance.has_credentials() && satisfies_query(instance, query) {
                last_match = Some((service, instance));
            }
        }
    }

    match last_match {
        Some((service, instance)) => {
            debug!(
                service,
                instance = instance.name.as_deref().unwrap_or("<unnamed>"),
                "Resolved credentials from catalog"
            );
            Lookup::Found(instance.credentials.clone())
        }
        None => Lookup::NotFound,
    }
}

/// Finds credentials matching a structured filter; the first match wins.
///
/// A literal service pattern must equal the catalog key exactly.
pub fn find_in_catalog(catalog: &ServiceCatalog, filter: &CredentialFilter) -> Lookup {
    for (service, instances) in catalog.services() {
        if let Some(pattern) = &filter.service
            && !service_matches_exactly(pattern, service)
        {
            continue;
        }
        if let Some(instance) = instances
            .iter()
            .find(|instance| instance.has_credentials() && satisfies_filter(instance, &filter.instance))
        {
            debug!(
                service,
                instance = instance.name.as_deref().unwrap_or("<unnamed>"),
                "Found credentials in catalog"
            );
            return Lookup::Found(instance.credentials.clone());
        }
    }
    Lookup::NotFound
}

fn service_matches_prefix(pattern: &NamePattern, normalized_literal: Option<&str>, service: &str) -> bool {
    match pattern {
        NamePattern::Literal(name) => {
            service == name || normalized_literal.is_some_and(|prefix| normalize_name(service).starts_with(prefix))
        }
        NamePattern::Regex(regex) => regex.is_match(service),
    }
}

fn service_matches_exactly(pattern: &NamePattern, service: &str) -> bool {
    match pattern {
        NamePattern::Literal(name) => service == name,
        NamePattern::Regex(regex) => regex.is_match(service),
    }
}

fn satisfies_query(instance: &Instance, query: &CredentialQuery) -> bool {
    let plan_matches = query.plan.as_deref().is_none_or(|plan| instance.plan.as_deref() == Some(plan));
    let name_matches = query.instance_name.as_deref().is_none_or(|wanted| {
        instance
            .name
            .as_deref()
            .is_some_and(|name| name.to_lowercase() == wanted.to_lowercase())
    });
    let tag_matches = query.tag.as_deref().is_none_or(|tag| instance.tags.iter().any(|candidate| candidate == tag));

    plan_matches && name_matches && tag_matches
}

fn satisfies_filter(instance: &Instance, filter: &InstanceFilter) -> bool {
    filter
        .iter()
        .all(|(field, expected)| instance.field(field).is_some_and(|actual| actual.matches(expected)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use svcreds_types::CredentialMap;

    fn credentials(user: &str) -> CredentialMap {
        serde_json::from_value(json!({"username": user, "password": "<password>"})).unwrap()
    }

    fn catalog() -> ServiceCatalog {
        ServiceCatalog::from_json_str(
            r#"{
                "personality_insights": [
                    {"plan": "not-a-plan"},
                    {"credentials": {}, "plan": "beta"},
                    {"credentials": {"username": "pi-standard", "password": "<password>"}, "plan": "standard"}
                ],
                "natural_language_classifier": [
                    {"name": "NLC 1", "plan": "standard", "credentials": {"username": "nlc-1", "password": "<password>"}},
                    {"name": "NLC 2", "plan": "standard", "credentials": {"username": "nlc-2", "password": "<password>"}}
                ],
                "object_storage": [
                    {"name": "OS 1", "plan": "standard", "tags": ["eu"], "credentials": {"username": "os-eu", "password": "<password>"}},
                    {"name": "OS 2", "plan": "standard", "tags": ["us"], "provider": "acme", "credentials": {"username": "os-us", "password": "<password>"}}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn last_credentialed_instance_wins() {
        let lookup = resolve_from_catalog(&catalog(), &CredentialQuery::new().service("natural_language_classifier"));
        assert_eq!(lookup, Lookup::Found(credentials("nlc-2")));
    }

    #[test]
    fn literal_service_matches_by_normalized_prefix() {
        let lookup = resolve_from_catalog(&catalog(), &CredentialQuery::new().service("Personality"));
        assert_eq!(lookup, Lookup::Found(credentials("pi-standard")));
    }

    #[test]
    fn regex_service_pattern_is_searched() {
        let query = CredentialQuery::new().service(NamePattern::regex("storage$").unwrap());
        assert_eq!(resolve_from_catalog(&catalog(), &query), Lookup::Found(credentials("os-us")));
    }

    #[test]
    fn instance_name_comparison_ignores_case() {
        let query = CredentialQuery::new().service("natural_language_classifier").instance_name("nlc 1");
        assert_eq!(resolve_from_catalog(&catalog(), &query), Lookup::Found(credentials("nlc-1")));
    }

    #[test]
    fn all_filters_must_hold() {
        let query = CredentialQuery::new().service("object_storage").plan("standard").tag("eu");
        assert_eq!(resolve_from_catalog(&catalog(), &query), Lookup::Found(credentials("os-eu")));

        let query = CredentialQuery::new().service("object_storage").plan("foo").tag("eu");
        assert_eq!(resolve_from_catalog(&catalog(), &query), Lookup::NotFound);
    }

    #[test]
    fn uncredentialed_instances_never_match() {
        let beta = CredentialQuery::new().service("personality").plan("beta");
        let unprovisioned = CredentialQuery::new().service("personality_insights").plan("not-a-plan");
        assert_eq!(resolve_from_catalog(&catalog(), &beta), Lookup::NotFound);
        assert_eq!(resolve_from_catalog(&catalog(), &unprovisioned), Lookup::NotFound);
    }

    #[test]
    fn missing_service_pattern_scans_every_service() {
        let query = CredentialQuery::new().tag("eu");
        assert_eq!(resolve_from_catalog(&catalog(), &query), Lookup::Found(credentials("os-eu")));
    }

    #[test]
    fn find_returns_first_credentialed_instance_for_empty_filter() {
        assert_eq!(find_in_catalog(&catalog(), &CredentialFilter::new()), Lookup::Found(credentials("pi-standard")));
    }

    #[test]
    fn find_requires_exact_literal_service() {
        let prefix = CredentialFilter::new().service("personality");
        assert_eq!(find_in_catalog(&catalog(), &prefix), Lookup::NotFound);

        let regex = CredentialFilter::new().service(NamePattern::regex("^personality").unwrap());
        assert_eq!(find_in_catalog(&catalog(), &regex), Lookup::Found(credentials("pi-standard")));
    }

    #[test]
    fn find_stops_at_first_match() {
        let filter = CredentialFilter::new()
            .service("natural_language_classifier")
            .instance(InstanceFilter::new().plan("standard"));
        assert_eq!(find_in_catalog(&catalog(), &filter), Lookup::Found(credentials("nlc-1")));
    }

    #[test]
    fn find_matches_arbitrary_instance_fields() {
        let filter = CredentialFilter::new().instance(InstanceFilter::new().field("provider", "acme"));
        assert_eq!(find_in_catalog(&catalog(), &filter), Lookup::Found(credentials("os-us")));

        let filter = CredentialFilter::new().instance(InstanceFilter::new().name("foo").tag("eu"));
        assert_eq!(find_in_catalog(&catalog(), &filter), Lookup::NotFound);
    }
}
