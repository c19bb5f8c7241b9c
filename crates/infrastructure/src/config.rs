//! Runtime settings.
//!
//! Layered, lowest priority first: built-in defaults, a TOML file
//! (`--config PATH`, or `envlink.toml` in the working directory when present),
//! then `ENVLINK_*` environment variables (`ENVLINK_DATA_FILE`, ...).

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

const DEFAULT_FILE_STEM: &str = "envlink";
const ENV_PREFIX: &str = "ENVLINK";

/// Errors that can occur while loading settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// A source could not be read or a value has the wrong type.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Application settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Path of the JSON store file.
    pub data_file: PathBuf,

    /// File name written by exports.
    pub env_file_name: String,

    /// Project used when a command omits one.
    #[serde(default)]
    pub default_project: Option<String>,

    /// Log filter used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Settings {
    /// Loads settings from defaults, an optional file and the environment.
    ///
    /// An explicit `path` must exist; the implicit `envlink.toml` is optional.
    ///
    /// # Errors
    /// Returns `SettingsError` if a source is unreadable or malformed.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let file = match path {
            Some(path) => File::from(path).format(FileFormat::Toml).required(true),
            None => File::new(DEFAULT_FILE_STEM, FileFormat::Toml).required(false),
        };

        let settings = Config::builder()
            .set_default("data_file", default_data_file().display().to_string())?
            .set_default("env_file_name", ".env")?
            .set_default("log_level", "info")?
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }
}

/// Default store location: the user data directory, or `./.envlink` without one.
#[must_use]
pub fn default_data_file() -> PathBuf {
    dirs::data_dir()
        .map_or_else(|| PathBuf::from(".envlink"), |dir| dir.join("envlink"))
        .join("store.json")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(
            &path,
            "data_file = \"/srv/envlink/store.json\"\ndefault_project = \"api\"\n",
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();

        assert_eq!(settings.data_file, PathBuf::from("/srv/envlink/store.json"));
        assert_eq!(settings.default_project.as_deref(), Some("api"));
        assert_eq!(settings.env_file_name, ".env");
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_explicit_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let result = Settings::load(Some(&dir.path().join("missing.toml")));
        assert!(matches!(result, Err(SettingsError::Config(_))));
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "data_file = [").unwrap();

        assert!(Settings::load(Some(&path)).is_err());
    }

    #[test]
    fn test_default_data_file_name() {
        let path = default_data_file();
        assert!(path.ends_with("envlink/store.json") || path.ends_with(".envlink/store.json"));
    }
}
