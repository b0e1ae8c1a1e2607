//! Store configuration.
//!
//! A [`PufferConfig`] can be built in code or read from a TOML file:
//!
//! ```toml
//! path = "cache/settings.json"
//!
//! [persistence]
//! flush_on_drop = true
//! sync_data = false
//! pretty = false
//! thread_name = "puffer-writer"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Default name of the writer thread.
pub const DEFAULT_THREAD_NAME: &str = "puffer-writer";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Configuration for opening a [`Puffer`](crate::Puffer).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PufferConfig {
    /// Backing file. Created on open if missing.
    pub path: PathBuf,

    #[serde(default)]
    pub persistence: PersistenceConfig,
}

/// How the writer thread persists snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Write any unpersisted changes when the store is dropped.
    pub flush_on_drop: bool,
    /// Call `sync_data` after each write.
    pub sync_data: bool,
    /// Indent the JSON file.
    pub pretty: bool,
    pub thread_name: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            flush_on_drop: true,
            sync_data: false,
            pretty: false,
            thread_name: DEFAULT_THREAD_NAME.to_string(),
        }
    }
}

impl PufferConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            persistence: PersistenceConfig::default(),
        }
    }

    pub fn flush_on_drop(mut self, enabled: bool) -> Self {
        self.persistence.flush_on_drop = enabled;
        self
    }

    pub fn sync_data(mut self, enabled: bool) -> Self {
        self.persistence.sync_data = enabled;
        self
    }

    pub fn pretty(mut self, enabled: bool) -> Self {
        self.persistence.pretty = enabled;
        self
    }

    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.persistence.thread_name = name.into();
        self
    }

    /// Load configuration from a TOML file.
    ///
    /// A relative `path` is resolved against the directory holding the
    /// config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_toml(&content)?;
        if config.path.is_relative()
            && let Some(parent) = path.parent()
        {
            config.path = parent.join(&config.path);
        }
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("path must not be empty".to_string()));
        }
        if self.persistence.thread_name.is_empty() {
            return Err(ConfigError::Invalid(
                "persistence.thread_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_config() {
        let config = PufferConfig::from_toml(
            r#"
path = "/var/cache/app.json"

[persistence]
flush_on_drop = false
sync_data = true
pretty = true
thread_name = "app-writer"
"#,
        )
        .unwrap();

        assert_eq!(config.path, PathBuf::from("/var/cache/app.json"));
        assert!(!config.persistence.flush_on_drop);
        assert!(config.persistence.sync_data);
        assert!(config.persistence.pretty);
        assert_eq!(config.persistence.thread_name, "app-writer");
    }

    #[test]
    fn test_persistence_section_is_optional() {
        let config = PufferConfig::from_toml(r#"path = "store.json""#).unwrap();
        assert_eq!(config.persistence, PersistenceConfig::default());

        let config = PufferConfig::from_toml(
            r#"
path = "store.json"
[persistence]
pretty = true
"#,
        )
        .unwrap();
        assert!(config.persistence.pretty);
        assert!(config.persistence.flush_on_drop);
        assert_eq!(config.persistence.thread_name, DEFAULT_THREAD_NAME);
    }

    #[test]
    fn test_invalid_configs() {
        assert!(matches!(
            PufferConfig::from_toml(r#"path = """#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            PufferConfig::from_toml(
                r#"
path = "a.json"
[persistence]
thread_name = ""
"#
            ),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            PufferConfig::from_toml("[persistence]"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_from_file_resolves_relative_path() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("puffer.toml");
        fs::write(&config_path, r#"path = "data/store.json""#).unwrap();

        let config = PufferConfig::from_file(&config_path).unwrap();
        assert_eq!(config.path, dir.path().join("data/store.json"));

        let missing = PufferConfig::from_file(dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
