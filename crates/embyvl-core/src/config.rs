use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::CoreError;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Top-level console configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    pub admin: AdminConfig,
    pub logging: LoggingConfig,
}

/// Where the proxy's admin API lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub filter: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

impl ConsoleConfig {
    /// Load config: user file (if exists) merged over built-in defaults.
    pub fn load() -> Result<Self, CoreError> {
        let user_path = Self::config_path();
        if user_path.exists() {
            Self::load_from(&user_path)
        } else {
            tracing::debug!(path = %user_path.display(), "no user config, using defaults");
            Self::from_toml_str("")
        }
    }

    /// Load an explicit config file, merged over built-in defaults.
    pub fn load_from(path: &Path) -> Result<Self, CoreError> {
        tracing::debug!(path = %path.display(), "loading console config");
        let user_str = std::fs::read_to_string(path)
            .map_err(|e| CoreError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&user_str)
    }

    /// Parse a (possibly partial) TOML document over the built-in defaults.
    pub fn from_toml_str(user: &str) -> Result<Self, CoreError> {
        let mut merged: toml::Table =
            toml::from_str(DEFAULT_CONFIG).map_err(|e| CoreError::Config(e.to_string()))?;
        let overlay: toml::Table =
            toml::from_str(user).map_err(|e| CoreError::Config(e.to_string()))?;
        merge_tables(&mut merged, overlay);

        let config: ConsoleConfig = toml::Value::Table(merged)
            .try_into()
            .map_err(|e: toml::de::Error| CoreError::Config(e.to_string()))?;
        config.admin_url()?;
        Ok(config)
    }

    /// Save current config to the user config file.
    pub fn save(&self) -> Result<(), CoreError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), CoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| CoreError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Parsed admin API base URL.
    pub fn admin_url(&self) -> Result<Url, CoreError> {
        let url = Url::parse(&self.admin.base_url)
            .map_err(|e| CoreError::Config(format!("admin.base_url: {e}")))?;
        if url.cannot_be_a_base() {
            return Err(CoreError::Config(format!(
                "admin.base_url is not a base URL: {url}"
            )));
        }
        Ok(url)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.admin.timeout_secs.max(1))
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("embyvl.toml"))
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "embyvl")
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
    }
}

/// Recursively overlay `overlay` onto `base`; nested tables merge, everything else replaces.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = ConsoleConfig::default();
        assert_eq!(config.admin.base_url, "http://127.0.0.1:8001/api");
        assert_eq!(config.admin.timeout_secs, 30);
        assert!(config.logging.directory.is_none());
        assert!(config.admin_url().is_ok());
    }

    #[test]
    fn test_partial_user_file_keeps_defaults() {
        let config = ConsoleConfig::from_toml_str(
            r#"
            [admin]
            base_url = "http://nas.local:8001/api"
            "#,
        )
        .unwrap();
        assert_eq!(config.admin.base_url, "http://nas.local:8001/api");
        assert_eq!(config.admin.timeout_secs, 30);
        assert!(config.logging.filter.contains("embyvl"));
    }

    #[test]
    fn test_rejects_unparseable_base_url() {
        let err = ConsoleConfig::from_toml_str("[admin]\nbase_url = \"not a url\"").unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn test_zero_timeout_is_clamped() {
        let config = ConsoleConfig::from_toml_str("[admin]\ntimeout_secs = 0").unwrap();
        assert_eq!(config.request_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = ConsoleConfig::default();
        config.admin.timeout_secs = 5;
        config.logging.directory = Some(dir.path().join("logs"));
        config.save_to(&path).unwrap();

        let loaded = ConsoleConfig::load_from(&path).unwrap();
        assert_eq!(loaded.admin.timeout_secs, 5);
        assert_eq!(loaded.logging.directory, config.logging.directory);
    }
}
