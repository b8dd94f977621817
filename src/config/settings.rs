use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{VaultError, Result};

/// User-level configuration, loaded from `.filevault.toml`.
///
/// Every field has a sensible default so FileVault works out-of-the-box
/// without any config file at all.  Key-derivation costs are fixed by
/// the vault format and are deliberately not configurable here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Where `extract` writes files when `--out` is not given.
    #[serde(default = "default_extract_dir")]
    pub extract_dir: String,

    /// Whether `add` deletes source files by default.
    #[serde(default)]
    pub delete_original: bool,

    /// Whether `remove` asks for confirmation before discarding a file.
    #[serde(default = "default_confirm_remove")]
    pub confirm_remove: bool,

    /// Log filter used when `FILEVAULT_LOG` is unset (e.g. "warn", "filevault=debug").
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_extract_dir() -> String {
    ".".to_string()
}

fn default_confirm_remove() -> bool {
    true
}

fn default_log_level() -> String {
    "warn".to_string()
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            extract_dir: default_extract_dir(),
            delete_original: false,
            confirm_remove: default_confirm_remove(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the working directory.
    const FILE_NAME: &'static str = ".filevault.toml";

    /// Load settings from `<dir>/.filevault.toml`.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            VaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// Resolve the extraction directory, preferring an explicit override.
    pub fn extract_dir(&self, base: &Path, override_dir: Option<&Path>) -> PathBuf {
        match override_dir {
            Some(dir) => dir.to_path_buf(),
            None => base.join(&self.extract_dir),
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert_eq!(s.extract_dir, ".");
        assert!(!s.delete_original);
        assert!(s.confirm_remove);
        assert_eq!(s.log_level, "warn");
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.extract_dir, ".");
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
extract_dir = "restored"
delete_original = true
confirm_remove = false
log_level = "filevault=debug"
"#;
        fs::write(tmp.path().join(".filevault.toml"), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.extract_dir, "restored");
        assert!(settings.delete_original);
        assert!(!settings.confirm_remove);
        assert_eq!(settings.log_level, "filevault=debug");
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".filevault.toml"), "delete_original = true\n").unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert!(settings.delete_original);
        assert!(settings.confirm_remove);
        assert_eq!(settings.log_level, "warn");
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".filevault.toml"), "not valid {{toml").unwrap();

        let result = Settings::load(tmp.path());
        assert!(matches!(result, Err(VaultError::ConfigError(_))));
    }

    #[test]
    fn extract_dir_prefers_override() {
        let s = Settings {
            extract_dir: "out".to_string(),
            ..Settings::default()
        };
        let base = Path::new("/home/user");
        assert_eq!(s.extract_dir(base, None), PathBuf::from("/home/user/out"));
        assert_eq!(
            s.extract_dir(base, Some(Path::new("/tmp/x"))),
            PathBuf::from("/tmp/x")
        );
    }
}
