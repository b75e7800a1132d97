//! # Svcreds Engine
//!
//! Resolves service credentials from the configuration a hosting platform
//! exposes to an application: a structured catalog of bound service
//! instances, individually named JSON entries, a local credentials file, and
//! credential bundles embedded in request parameters.
//!
//! ## Usage
//!
//! ```rust
//! use svcreds_engine::{CredentialResolver, EnvironmentSnapshot};
//! use svcreds_types::CredentialQuery;
//!
//! let snapshot = EnvironmentSnapshot::from_vars([
//!     ("VCAP_SERVICES", r#"{"conversation": [{"plan": "standard", "credentials": {"username": "u"}}]}"#),
//!     ("CLOUDANT_NOSQL_DB_X5", r#"{"name": "Cloudant NoSQL DB-x5"}"#),
//! ]);
//! let resolver = CredentialResolver::new(snapshot);
//!
//! let credentials = resolver.get_credentials(&CredentialQuery::new().service("conversation"));
//! assert_eq!(credentials.get_str("username"), Some("u"));
//!
//! let entry = resolver.get_credentials(&CredentialQuery::new().instance_name("cloudant_nosql"));
//! assert_eq!(entry.get_str("name"), Some("Cloudant NoSQL DB-x5"));
//! ```
//!
//! ## Architecture
//!
//! - **`catalog`**: positional and filter-based search over the catalog
//! - **`flat`**: loose-name matching over flat configuration entries
//! - **`starter`**: local credentials file and starter-kit entries
//! - **`bind`**: credentials embedded in request parameters
//! - **`config`**: snapshots of the process environment and local file
//! - **`resolver`**: the façade chaining the strategies above

pub mod bind;
pub mod catalog;
pub mod config;
pub mod flat;
pub mod resolver;
pub mod starter;

pub use bind::{BIND_CREDENTIALS_KEY, extract_from_bind};
pub use catalog::{find_in_catalog, resolve_from_catalog};
pub use config::{
    CATALOG_ENV_VAR, ConfigError, EnvironmentSnapshot, LOCAL_CONFIG_PATH_ENV, LocalConfig, default_local_config_path, load_local_config,
    load_local_config_from_path,
};
pub use flat::resolve_from_flat_source;
pub use resolver::CredentialResolver;
pub use starter::{STARTER_PREFIX, credentials_from_local_config, credentials_from_starter_entry, starter_entry_key};

/// Credential field some providers use for IAM API keys.
pub const APIKEY_FIELD: &str = "apikey";

/// Name every API key is exposed under.
pub const IAM_APIKEY_FIELD: &str = "iam_apikey";
