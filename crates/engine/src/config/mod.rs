//! Configuration snapshots for credential resolution.
//!
//! The resolver never reads process state itself. This module captures the
//! environment and the optional local credentials file once, at the boundary.

mod io;
mod model;

pub use io::{LOCAL_CONFIG_PATH_ENV, default_local_config_path, load_local_config, load_local_config_from_path};
pub use model::{CATALOG_ENV_VAR, ConfigError, EnvironmentSnapshot, LocalConfig};
