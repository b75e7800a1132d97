use std::path::PathBuf;

use dirs_next::{config_dir, home_dir};

/// Expands a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    let trimmed = path.trim();
    let home = || home_dir().unwrap_or_else(|| PathBuf::from("~"));
    if trimmed == "~" {
        return home();
    }
    if let Some(rest) = trimmed.strip_prefix("~/").or_else(|| trimmed.strip_prefix("~\\")) {
        return home().join(rest);
    }
    PathBuf::from(trimmed)
}

/// Resolves a file path from an override variable, falling back to
/// `<config_dir>/svcreds/<file_name>`.
///
/// Blank override values are ignored.
pub fn config_file_path(override_env_var: &str, file_name: &str) -> PathBuf {
    if let Ok(path) = std::env::var(override_env_var)
        && !path.trim().is_empty()
    {
        return expand_tilde(&path);
    }

    config_dir().unwrap_or_else(|| PathBuf::from(".")).join("svcreds").join(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_home_prefix() {
        let Some(home) = home_dir() else {
            return;
        };
        assert_eq!(expand_tilde("~/svcreds/credentials.json"), home.join("svcreds/credentials.json"));
        assert_eq!(expand_tilde(" ~ "), home);
    }

    #[test]
    fn leaves_other_paths_alone() {
        assert_eq!(expand_tilde("/etc/svcreds.json"), PathBuf::from("/etc/svcreds.json"));
        assert_eq!(expand_tilde("relative/~/file"), PathBuf::from("relative/~/file"));
    }

    #[test]
    fn override_variable_wins_when_set() {
        temp_env::with_var("SVCREDS_TEST_PATH", Some("/tmp/override.json"), || {
            assert_eq!(config_file_path("SVCREDS_TEST_PATH", "credentials.json"), PathBuf::from("/tmp/override.json"));
        });
    }

    #[test]
    fn blank_override_falls_back_to_config_dir() {
        temp_env::with_var("SVCREDS_TEST_PATH", Some("   "), || {
            let path = config_file_path("SVCREDS_TEST_PATH", "credentials.json");
            assert!(path.ends_with("svcreds/credentials.json"));
        });
    }
}
