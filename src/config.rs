//! # Configuration Management Module
//!
//! ## Purpose
//! Centralized configuration management for the directory search service,
//! supporting configuration files and environment variable overrides with
//! validation and type-safe access to all system settings.
//!
//! ## Input/Output Specification
//! - **Input**: Configuration files (TOML), environment variables
//! - **Output**: Validated configuration structs with defaults and overrides
//! - **Validation**: Type checking, range validation
//!
//! ## Configuration Sources (in order of precedence)
//! 1. Environment variables (highest priority)
//! 2. Configuration files
//! 3. Default values (lowest priority)
//!
//! ## Usage
//! ```rust,no_run
//! use directory_search::config::Config;
//!
//! let config = Config::from_file("config.toml").unwrap();
//! println!("Server port: {}", config.server.port);
//! ```

use crate::errors::{DirectoryError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure containing all system settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server and API configuration
    pub server: ServerConfig,
    /// Storage and database settings
    pub storage: StorageConfig,
    /// Search behavior
    pub search: SearchConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server and API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Enable CORS for web frontends
    pub enable_cors: bool,
}

/// Storage and database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file path
    pub db_path: PathBuf,
}

/// Search behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum number of profiles returned by a search
    pub max_results: usize,
    /// Maximum number of autocomplete suggestions
    pub suggestion_limit: usize,
    /// Minimum query length before suggestion mining runs
    pub min_suggestion_query_length: usize,
    /// Default number of history entries returned per user
    pub default_history_limit: usize,
    /// Maximum accepted query length in characters
    pub max_query_length: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Enable structured JSON logging
    pub json_format: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            enable_cors: true,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("data/directory.db"),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 50,
            suggestion_limit: 10,
            min_suggestion_query_length: 2,
            default_history_limit: 10,
            max_query_length: 256,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::from_file("config.toml")
    }

    /// Load configuration from a specific file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!("Configuration file not found: {:?}, using defaults", path);
            let mut config = Self::default();
            config.apply_env_overrides()?;
            config.validate()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path).map_err(|e| DirectoryError::Config {
            message: format!("Failed to read config file {:?}: {}", path, e),
        })?;

        let mut config: Config = toml::from_str(&content).map_err(|e| DirectoryError::Config {
            message: format!("Failed to parse config file {:?}: {}", path, e),
        })?;

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("DIRECTORY_SEARCH_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("DIRECTORY_SEARCH_PORT") {
            self.server.port = port.parse().map_err(|_| DirectoryError::Config {
                message: "Invalid port number in DIRECTORY_SEARCH_PORT".to_string(),
            })?;
        }
        if let Ok(db_path) = std::env::var("DIRECTORY_SEARCH_DB_PATH") {
            self.storage.db_path = PathBuf::from(db_path);
        }
        if let Ok(level) = std::env::var("DIRECTORY_SEARCH_LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(())
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(DirectoryError::Config {
                message: "server.port cannot be zero".to_string(),
            });
        }

        if self.search.max_results == 0 {
            return Err(DirectoryError::Config {
                message: "search.max_results must be greater than zero".to_string(),
            });
        }

        if self.search.suggestion_limit == 0 {
            return Err(DirectoryError::Config {
                message: "search.suggestion_limit must be greater than zero".to_string(),
            });
        }

        if self.search.min_suggestion_query_length == 0 {
            return Err(DirectoryError::Config {
                message: "search.min_suggestion_query_length must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_caps() {
        let config = Config::default();
        assert_eq!(config.search.max_results, 50);
        assert_eq!(config.search.suggestion_limit, 10);
        assert_eq!(config.search.min_suggestion_query_length, 2);
        assert_eq!(config.search.default_history_limit, 10);
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 9090

            [search]
            max_results = 25
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.search.max_results, 25);
        assert_eq!(config.search.suggestion_limit, 10);
    }

    #[test]
    fn rejects_zero_result_cap() {
        let mut config = Config::default();
        config.search.max_results = 0;
        assert!(config.validate().is_err());
    }
}
