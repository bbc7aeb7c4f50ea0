//! `bidcap` configuration file.
//!
//! ```toml
//! [database]
//! backend = "sqlite"
//! connection_string = "bidcap.db"
//!
//! [logging]
//! level = "info"
//! file = "/var/log/bidcap.log"
//! ```
//!
//! Every key is optional. Command-line flags override whatever is read here.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Where the company snapshot is kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// SQLite file (or `:memory:`) named by `connection_string`.
    #[default]
    Sqlite,
    /// Process memory; nothing outlives the command.
    Memory,
}

impl fmt::Display for StorageBackend {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            StorageBackend::Sqlite => f.write_str("sqlite"),
            StorageBackend::Memory => f.write_str("memory"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseSection {
    pub backend: StorageBackend,
    /// Ignored by the memory backend.
    pub connection_string: String,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            connection_string: "bidcap.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub database: DatabaseSection,
    pub logging: LoggingSection,
}

impl AppConfig {
    /// `<config dir>/bidcap/config.toml`, when the platform has a config
    /// directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("bidcap").join("config.toml"))
    }

    pub fn from_toml_str(
        content: &str,
        path: &Path,
    ) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }

    /// Reads `explicit` if given; it must exist. Otherwise reads the default
    /// location if a file is there, and falls back to built-in defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None => match Self::default_path() {
                Some(path) if path.is_file() => Self::load(&path),
                _ => Ok(Self::default()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_are_sqlite_file_and_info() {
        let config = AppConfig::default();

        assert_eq!(config.database.backend, StorageBackend::Sqlite);
        assert_eq!(config.database.connection_string, "bidcap.db");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, None);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = AppConfig::from_toml_str(
            "[logging]\nlevel = \"debug\"\n",
            Path::new("config.toml"),
        )
        .unwrap();

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.database, DatabaseSection::default());
    }

    #[test]
    fn full_file_is_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[database]\nbackend = \"memory\"\nconnection_string = \"\"\n\n[logging]\nlevel = \"warn\"\nfile = \"/tmp/bidcap.log\""
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();

        assert_eq!(
            config.database,
            DatabaseSection {
                backend: StorageBackend::Memory,
                connection_string: String::new(),
            }
        );
        assert_eq!(config.logging.file, Some(PathBuf::from("/tmp/bidcap.log")));
    }

    #[test]
    fn unknown_key_is_parse_error() {
        let result = AppConfig::from_toml_str(
            "[database]\nbackend = \"sqlite\"\nurl = \"x\"\n",
            Path::new("config.toml"),
        );

        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn unknown_backend_names_the_choices() {
        let result = AppConfig::from_toml_str(
            "[database]\nbackend = \"postgres\"\n",
            Path::new("config.toml"),
        );

        let message = result.unwrap_err().to_string();
        assert!(message.contains("postgres"), "{message}");
        assert!(message.contains("sqlite"), "{message}");
    }

    #[test]
    fn explicit_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");

        match AppConfig::resolve(Some(&missing)) {
            Err(ConfigError::Read { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected Read error, got {other:?}"),
        }
    }
}
