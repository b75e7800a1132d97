//! Shared data model for service credential resolution.
//!
//! The types here describe the three credential sources a hosting platform may
//! expose (a structured [`ServiceCatalog`], a [`FlatConfigSource`] of
//! individually named entries, and [`RequestParams`] carrying an embedded bind
//! bundle) together with the queries and filters used to search them.

pub mod catalog;
pub mod credentials;
pub mod filter;

pub use catalog::{FieldRef, FlatConfigSource, Instance, ServiceCatalog, SkippedEntry};
pub use credentials::{CredentialMap, Lookup, RequestParams};
pub use filter::{CredentialFilter, CredentialQuery, InstanceField, InstanceFilter, NamePattern};
