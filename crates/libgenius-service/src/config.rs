//! # Service Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     LIBGENIUS_DB_PATH=/srv/library.db                                  │
//! │     LIBGENIUS_IMPORT_POLICY=permissive                                 │
//! │     LIBGENIUS_EVENT_CAPACITY=128                                       │
//! │     LIBGENIUS_LOG=debug                                                │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/libgenius/libgenius.toml (Linux)                         │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "/srv/library/libgenius.db"
//! max_connections = 5
//!
//! [lending]
//! import_policy = "strict"   # strict | permissive
//! event_capacity = 64
//!
//! [logging]
//! filter = "info,libgenius=debug,sqlx=warn"
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use libgenius_core::ImportPolicy;
use libgenius_db::DbConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ServiceError, ServiceResult};
use crate::events::DEFAULT_EVENT_CAPACITY;
use crate::telemetry::DEFAULT_LOG_FILTER;

const CONFIG_FILE_NAME: &str = "libgenius.toml";
const DB_FILE_NAME: &str = "libgenius.db";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "libgenius", "libgenius")
}

// =============================================================================
// Database Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file. Defaults to the platform data directory.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join(DB_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(DB_FILE_NAME))
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

// =============================================================================
// Lending Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LendingSettings {
    /// How strictly bulk imports are checked.
    #[serde(default)]
    pub import_policy: ImportPolicy,

    /// Buffered reservation events per subscriber.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_event_capacity() -> usize {
    DEFAULT_EVENT_CAPACITY
}

impl Default for LendingSettings {
    fn default() -> Self {
        LendingSettings {
            import_policy: ImportPolicy::default(),
            event_capacity: default_event_capacity(),
        }
    }
}

// =============================================================================
// Logging Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directive. `RUST_LOG` still wins.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: default_log_filter(),
        }
    }
}

// =============================================================================
// Library Configuration
// =============================================================================

/// Complete service configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub lending: LendingSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl LibraryConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`libgenius.toml`)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ServiceResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Parses a TOML config file. Missing sections fall back to defaults.
    pub fn from_file(path: &Path) -> ServiceResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ServiceResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ServiceError::Config("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ServiceResult<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(ServiceError::Config("database.path must not be empty".into()));
        }

        if self.database.max_connections == 0 {
            return Err(ServiceError::Config(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if self.lending.event_capacity == 0 {
            return Err(ServiceError::Config(
                "lending.event_capacity must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies overrides from a variable lookup (the process environment
    /// in [`LibraryConfig::load`]).
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("LIBGENIUS_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(policy) = lookup("LIBGENIUS_IMPORT_POLICY") {
            match policy.parse::<ImportPolicy>() {
                Ok(parsed) => {
                    debug!(policy = %parsed, "Overriding import policy from environment");
                    self.lending.import_policy = parsed;
                }
                Err(e) => warn!("Ignoring LIBGENIUS_IMPORT_POLICY: {}", e),
            }
        }

        if let Some(capacity) = lookup("LIBGENIUS_EVENT_CAPACITY") {
            match capacity.parse::<usize>() {
                Ok(c) => self.lending.event_capacity = c,
                Err(_) => warn!(value = %capacity, "Ignoring non-numeric LIBGENIUS_EVENT_CAPACITY"),
            }
        }

        if let Some(filter) = lookup("LIBGENIUS_LOG") {
            self.logging.filter = filter;
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Builds the pool configuration for the SQLite store.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database.path.clone()).max_connections(self.database.max_connections)
    }
}
