//! Local credentials file IO.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use svcreds_util::config_file_path;
use tracing::{debug, warn};

use crate::config::{ConfigError, LocalConfig};

/// Overrides the location of the local credentials file.
pub const LOCAL_CONFIG_PATH_ENV: &str = "SVCREDS_CREDENTIALS_PATH";

const LOCAL_CONFIG_FILE_NAME: &str = "credentials.json";

/// Returns the default path for the local credentials file.
pub fn default_local_config_path() -> PathBuf {
    config_file_path(LOCAL_CONFIG_PATH_ENV, LOCAL_CONFIG_FILE_NAME)
}

/// Loads local credentials from the default path.
pub fn load_local_config() -> Result<Option<LocalConfig>, ConfigError> {
    load_local_config_from_path(&default_local_config_path())
}

/// Loads local credentials from a specific path.
///
/// A missing file yields `Ok(None)`. A file that is not a JSON object is
/// logged and also yields `Ok(None)`; only IO failures are errors.
pub fn load_local_config_from_path(path: &Path) -> Result<Option<LocalConfig>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(error) if error.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "No local credentials file");
            return Ok(None);
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(object)) => Ok(Some(object.into_iter().collect())),
        Ok(_) => {
            warn!(path = %path.display(), "Local credentials file is not a JSON object; ignoring it");
            Ok(None)
        }
        Err(error) => {
            warn!(path = %path.display(), error = %error, "Local credentials file is malformed; ignoring it");
            Ok(None)
        }
    }
}
