//! Configuration resolution for `LightBnB`.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/lightbnb/settings.json)
//! 3. Explicit config file supplied by the host
//! 4. Environment variables
//! 5. CLI arguments (highest priority, applied by the host)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Complete `LightBnB` configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: Option<PathBuf>,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_connections: 5,
        }
    }
}

impl DatabaseConfig {
    /// Configured path, falling back to the platform default.
    pub fn resolved_path(&self) -> Option<PathBuf> {
        self.path.clone().or_else(database_path)
    }
}

/// Property search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Row cap used when a search does not name its own limit.
    pub default_limit: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { default_limit: 10 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Load configuration with hierarchical resolution.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let mut config = Config::default();

    if let Some(global_path) = global_config_path() {
        if global_path.exists() {
            let global = load_config_file(&global_path)?;
            merge_config(&mut config, global);
        }
    }

    if let Some(path) = explicit {
        let file = load_config_file(path)?;
        merge_config(&mut config, file);
    }

    apply_env_overrides(&mut config);
    validate(&config)?;

    Ok(config)
}

/// Get the global config file path.
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("lightbnb").join("settings.json"))
}

/// Get the default database path.
pub fn database_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("lightbnb").join("lightbnb.db"))
}

/// One config file's contents. Only the keys present in the file are `Some`,
/// so a file never resets what a lower-priority layer set.
#[derive(Debug, Default, Deserialize)]
struct ConfigLayer {
    #[serde(default)]
    database: DatabaseLayer,
    #[serde(default)]
    search: SearchLayer,
    #[serde(default)]
    logging: LoggingLayer,
}

#[derive(Debug, Default, Deserialize)]
struct DatabaseLayer {
    path: Option<PathBuf>,
    max_connections: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchLayer {
    default_limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingLayer {
    level: Option<String>,
    json: Option<bool>,
}

fn load_config_file(path: &Path) -> Result<ConfigLayer> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

fn merge_config(base: &mut Config, layer: ConfigLayer) {
    if let Some(path) = layer.database.path {
        base.database.path = Some(path);
    }
    if let Some(n) = layer.database.max_connections {
        base.database.max_connections = n;
    }
    if let Some(n) = layer.search.default_limit {
        base.search.default_limit = n;
    }
    if let Some(level) = layer.logging.level {
        base.logging.level = level;
    }
    if let Some(json) = layer.logging.json {
        base.logging.json = json;
    }
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(val) = std::env::var("LIGHTBNB_DB_PATH") {
        config.database.path = Some(PathBuf::from(val));
    }
    if let Ok(val) = std::env::var("LIGHTBNB_MAX_CONNECTIONS") {
        if let Ok(n) = val.parse() {
            config.database.max_connections = n;
        }
    }
    if let Ok(val) = std::env::var("LIGHTBNB_DEFAULT_LIMIT") {
        if let Ok(n) = val.parse() {
            config.search.default_limit = n;
        }
    }
    if let Ok(val) = std::env::var("LIGHTBNB_LOG_LEVEL") {
        config.logging.level = val;
    }
    if let Ok(val) = std::env::var("LIGHTBNB_LOG_JSON") {
        config.logging.json = matches!(val.as_str(), "1" | "true" | "yes");
    }
}

fn validate(config: &Config) -> Result<()> {
    if config.database.max_connections == 0 {
        return Err(Error::Config(
            "database.max_connections must be at least 1".to_string(),
        ));
    }
    if config.search.default_limit == 0 {
        return Err(Error::Config(
            "search.default_limit must be at least 1".to_string(),
        ));
    }
    Ok(())
}
