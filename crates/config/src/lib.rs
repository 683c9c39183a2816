//! Libris Configuration System
//!
//! TOML-backed application configuration. Loading is forgiving (a
//! missing file yields defaults), saving is atomic (write to a temp
//! file, then rename), and every loaded config is validated before use.

mod error;

pub use error::{ConfigError, ConfigResult};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Current config file format version
pub const CONFIG_VERSION: u32 = 1;

/// Default file name inside the config directory
const CONFIG_FILE: &str = "libris.toml";

/// Database settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatabaseSection {
    /// Database file path (relative paths resolve against the working
    /// directory)
    pub path: PathBuf,

    /// Maximum number of pooled connections
    pub max_connections: u32,

    /// Enable Write-Ahead Logging
    pub enable_wal: bool,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from("libris.db"),
            max_connections: 10,
            enable_wal: true,
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerSection {
    /// Address the HTTP server binds to
    pub bind_addr: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Config file format version
    pub version: u32,

    /// Database settings
    pub database: DatabaseSection,

    /// HTTP server settings
    pub server: ServerSection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            database: DatabaseSection::default(),
            server: ServerSection::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "database.path cannot be empty".to_string(),
            ));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "database.max_connections must be at least 1".to_string(),
            ));
        }

        if self.server.bind_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::ValidationError(format!(
                "server.bind_addr '{}' is not a valid socket address",
                self.server.bind_addr
            )));
        }

        Ok(())
    }

    /// Loads the config from a file; a missing file yields defaults
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Config = toml::from_str(&text).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Saves the config atomically: the file on disk is either the old
    /// version or the new one, never a partial write
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let text = toml::to_string_pretty(self)?;

        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::WriteError {
            path: path.to_path_buf(),
            source,
        })?;

        let tmp = tempfile::NamedTempFile::new_in(dir).map_err(|source| {
            ConfigError::WriteError {
                path: path.to_path_buf(),
                source,
            }
        })?;

        std::fs::write(tmp.path(), text).map_err(|source| ConfigError::WriteError {
            path: path.to_path_buf(),
            source,
        })?;

        tmp.persist(path).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e.error,
        })?;

        Ok(())
    }

    /// Default config file location for this platform
    pub fn default_path() -> ConfigResult<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "libris")
            .ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join(CONFIG_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.version, CONFIG_VERSION);
    }

    #[test]
    fn test_round_trip_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("libris.toml");

        let mut config = Config::default();
        config.database.max_connections = 5;
        config.server.bind_addr = "0.0.0.0:9000".to_string();

        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn test_rejects_zero_connections() {
        let mut config = Config::default();
        config.database.max_connections = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_rejects_empty_database_path() {
        let mut config = Config::default();
        config.database.path = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_bind_addr() {
        let mut config = Config::default();
        config.server.bind_addr = "not-an-address".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("libris.toml");
        std::fs::write(&path, "[database]\nmax_connections = 0\n").unwrap();

        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_unknown_file_content_fails_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("libris.toml");
        std::fs::write(&path, "this is not toml {{{").unwrap();

        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }
}
