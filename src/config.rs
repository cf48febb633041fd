//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub datasource: DataSourceConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// JSON API connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct DataSourceConfig {
    #[serde(default = "default_url")]
    pub url: String,

    /// Extra query string appended to every request, e.g. `api_key=abc`
    #[serde(default)]
    pub query_params: String,

    /// Headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("json-datasource/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            query_params: String::new(),
            headers: HashMap::new(),
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment.
    ///
    /// Runs before logging is set up, so the outcome is returned rather than
    /// logged; call [`LoadedConfig::report`] once a subscriber is installed.
    pub fn load_default() -> LoadedConfig {
        let config_paths: Vec<PathBuf> = [
            dirs::config_dir().map(|p| p.join("json-datasource").join("config.toml")),
            Some(PathBuf::from("/etc/json-datasource/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect();

        Self::load_first(&config_paths)
    }

    /// Load the first existing candidate that parses, remembering the ones
    /// that failed
    fn load_first(candidates: &[PathBuf]) -> LoadedConfig {
        let mut skipped = Vec::new();

        for path in candidates.iter().filter(|p| p.exists()) {
            match Self::load_with_env(path) {
                Ok(config) => {
                    return LoadedConfig {
                        config,
                        source: ConfigSource::File(path.clone()),
                        skipped,
                    }
                }
                Err(e) => skipped.push(e),
            }
        }

        LoadedConfig {
            config: Self::from_env(),
            source: ConfigSource::Defaults,
            skipped,
        }
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("JSON_DATASOURCE_URL") {
            self.datasource.url = url;
        }
        if let Some(params) = lookup("JSON_DATASOURCE_QUERY_PARAMS") {
            self.datasource.query_params = params;
        }
        if let Some(timeout) = lookup("JSON_DATASOURCE_TIMEOUT_SECS") {
            if let Ok(t) = timeout.parse() {
                self.datasource.timeout_secs = t;
            }
        }

        if let Some(level) = lookup("JSON_DATASOURCE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("JSON_DATASOURCE_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Where a loaded configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// Built-in defaults plus environment overrides
    Defaults,
}

/// Result of loading configuration
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: Config,
    pub source: ConfigSource,
    /// Config files that exist but could not be loaded
    pub skipped: Vec<ConfigError>,
}

impl LoadedConfig {
    /// Configuration read from an explicitly chosen file
    pub fn from_file(path: PathBuf, config: Config) -> Self {
        Self {
            config,
            source: ConfigSource::File(path),
            skipped: Vec::new(),
        }
    }

    /// Log where the configuration came from and any file that was skipped
    pub fn report(&self) {
        for error in &self.skipped {
            tracing::warn!("Skipping config file: {}", error);
        }
        match &self.source {
            ConfigSource::File(path) => tracing::info!("Loaded config from {:?}", path),
            ConfigSource::Defaults => {
                tracing::info!("Using default config with environment overrides")
            }
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# JSON data source configuration
#
# Environment variables override these settings:
# - JSON_DATASOURCE_URL
# - JSON_DATASOURCE_QUERY_PARAMS
# - JSON_DATASOURCE_TIMEOUT_SECS
# - JSON_DATASOURCE_LOG_LEVEL
# - JSON_DATASOURCE_LOG_FORMAT

[datasource]
# Base URL of the JSON API; query paths are appended to it
url = "http://localhost:8080"

# Query string added to every request
query_params = ""

# Request timeout in seconds
timeout_secs = 30

# Headers sent with every request
[datasource.headers]
# Authorization = "Bearer <token>"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
