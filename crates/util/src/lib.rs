//! Helpers shared across the svcreds crates: name normalization, secret
//! redaction and configuration path handling.

pub mod path_processing;
pub mod text_processing;

pub use path_processing::{config_file_path, expand_tilde};
pub use text_processing::{
    is_discriminator, is_environment_style_key, is_secret_field, normalize_name, redact_credentials, redact_sensitive,
};
