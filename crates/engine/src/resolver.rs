//! The credential resolution façade.
//!
//! [`CredentialResolver`] owns an [`EnvironmentSnapshot`] and chains the
//! individual strategies: the structured catalog first, then the loose-name
//! matcher over flat entries. Every entry point collapses "not found" to an
//! empty [`CredentialMap`].

use svcreds_types::{CredentialFilter, CredentialMap, CredentialQuery, Lookup, NamePattern, RequestParams};
use tracing::debug;

use crate::bind::extract_from_bind;
use crate::catalog::{find_in_catalog, resolve_from_catalog};
use crate::config::{EnvironmentSnapshot, LocalConfig};
use crate::flat::resolve_from_flat_source;
use crate::starter::{credentials_from_local_config, credentials_from_starter_entry};

#[derive(Debug, Clone, Default)]
pub struct CredentialResolver {
    snapshot: EnvironmentSnapshot,
}

impl CredentialResolver {
    pub fn new(snapshot: EnvironmentSnapshot) -> Self {
        Self { snapshot }
    }

    /// Resolver over the current process environment.
    pub fn from_process_env() -> Self {
        Self::new(EnvironmentSnapshot::from_process_env())
    }

    pub fn snapshot(&self) -> &EnvironmentSnapshot {
        &self.snapshot
    }

    /// Looks up credentials from positional criteria.
    ///
    /// The catalog is searched first (last match wins). On a miss the flat
    /// entries are matched against the instance name, or the literal service
    /// name when no instance name was given. A query without any criterion
    /// returns an empty map.
    pub fn get_credentials(&self, query: &CredentialQuery) -> CredentialMap {
        if query.is_empty() {
            return CredentialMap::new();
        }

        resolve_from_catalog(&self.snapshot.catalog, query)
            .or_else(|| {
                let target = query.instance_name.as_deref().or_else(|| literal(query.service.as_ref()));
                self.resolve_flat(target)
            })
            .into_credentials()
    }

    /// Looks up credentials with a structured filter; the first match wins.
    ///
    /// `None` returns an empty map. An empty filter returns the first
    /// credentialed instance in catalog order.
    pub fn find_credentials(&self, filter: Option<&CredentialFilter>) -> CredentialMap {
        let Some(filter) = filter else {
            return CredentialMap::new();
        };

        find_in_catalog(&self.snapshot.catalog, filter)
            .or_else(|| {
                let target = filter.instance.instance_name().or_else(|| literal(filter.service.as_ref()));
                self.resolve_flat(target)
            })
            .into_credentials()
    }

    /// Credentials for a starter kit.
    ///
    /// Sources in order: the local credentials file, the
    /// `service_watson_<service>` entry, then [`Self::get_credentials`] with
    /// the service name.
    pub fn get_credentials_for_starter(&self, service: &str, local_config: Option<&LocalConfig>) -> CredentialMap {
        if service.trim().is_empty() {
            return CredentialMap::new();
        }

        let local = self.get_credentials_from_local_config(service, local_config);
        if !local.is_empty() {
            return local;
        }

        credentials_from_starter_entry(&self.snapshot.entries, service)
            .or_else(|| {
                debug!(service, "Falling back to environment lookup for starter");
                Lookup::Found(self.get_credentials(&CredentialQuery::new().service(service)))
            })
            .into_credentials()
    }

    /// The local-file branch of [`Self::get_credentials_for_starter`] alone.
    pub fn get_credentials_from_local_config(&self, service: &str, local_config: Option<&LocalConfig>) -> CredentialMap {
        local_config.map(|config| credentials_from_local_config(service, config)).unwrap_or_default()
    }

    /// See [`extract_from_bind`].
    pub fn get_credentials_from_service_bind(
        &self,
        params: &RequestParams,
        service: &str,
        alt_name: Option<&str>,
    ) -> RequestParams {
        extract_from_bind(params, service, alt_name)
    }

    fn resolve_flat(&self, target: Option<&str>) -> Lookup {
        match target {
            Some(target) => resolve_from_flat_source(&self.snapshot.entries, target),
            None => Lookup::NotFound,
        }
    }
}

fn literal(pattern: Option<&NamePattern>) -> Option<&str> {
    pattern.and_then(NamePattern::as_literal)
}
