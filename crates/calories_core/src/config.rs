//! Storage and logging configuration.
//!
//! # Responsibility
//! - Derive database and log locations from one caller-owned data directory.
//! - Bootstrap logging and the SQLite connection from those locations.
//!
//! # Invariants
//! - All configured paths are absolute.
//! - Configuration is passed explicitly; nothing is read from the environment.

use crate::db::{open_db, DbResult};
use crate::logging::{default_log_level, init_logging};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// File name of the meal database inside the data directory.
pub const DB_FILE_NAME: &str = "caloriescalc.sqlite3";
/// Sub-directory of the data directory that holds rolling logs.
pub const LOG_DIR_NAME: &str = "logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyDataDir,
    RelativeDataDir(PathBuf),
    NonUtf8Path(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDataDir => write!(f, "data directory cannot be empty"),
            Self::RelativeDataDir(path) => write!(
                f,
                "data directory must be an absolute path, got `{}`",
                path.display()
            ),
            Self::NonUtf8Path(path) => {
                write!(f, "path is not valid UTF-8: `{}`", path.display())
            }
        }
    }
}

impl Error for ConfigError {}

/// Locations and log level for one application instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
}

impl StoreConfig {
    /// Builds the default layout under `data_dir`:
    /// `<data_dir>/caloriescalc.sqlite3` and `<data_dir>/logs/`.
    pub fn in_data_dir(data_dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data_dir = data_dir.as_ref();
        if data_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyDataDir);
        }
        if !data_dir.is_absolute() {
            return Err(ConfigError::RelativeDataDir(data_dir.to_path_buf()));
        }

        Ok(Self {
            db_path: data_dir.join(DB_FILE_NAME),
            log_dir: data_dir.join(LOG_DIR_NAME),
            log_level: default_log_level().to_string(),
        })
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Starts rolling file logs at `log_dir`. Idempotent for the same config.
    pub fn init_logging(&self) -> Result<(), String> {
        let log_dir = self
            .log_dir
            .to_str()
            .ok_or_else(|| ConfigError::NonUtf8Path(self.log_dir.clone()).to_string())?;
        init_logging(&self.log_level, log_dir)
    }

    /// Opens (creating if needed) and migrates the meal database.
    pub fn open_connection(&self) -> DbResult<Connection> {
        open_db(&self.db_path)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, StoreConfig, DB_FILE_NAME};
    use std::path::Path;

    #[test]
    fn in_data_dir_derives_paths() {
        let root = std::env::temp_dir().join("caloriescalc-config");
        let config = StoreConfig::in_data_dir(&root).unwrap();

        assert_eq!(config.db_path, root.join(DB_FILE_NAME));
        assert_eq!(config.log_dir, root.join("logs"));
        assert!(!config.log_level.is_empty());
    }

    #[test]
    fn in_data_dir_rejects_relative_paths() {
        let err = StoreConfig::in_data_dir("data/dev").unwrap_err();
        assert_eq!(err, ConfigError::RelativeDataDir(Path::new("data/dev").to_path_buf()));
        assert_eq!(StoreConfig::in_data_dir("").unwrap_err(), ConfigError::EmptyDataDir);
    }
}
