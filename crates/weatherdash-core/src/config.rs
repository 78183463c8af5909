use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Default weatherapi.com endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";

/// Key used when no API key is configured anywhere. Requests made with it
/// fail upstream with 401, which the weather store reports as `invalidApiKey`.
pub const PLACEHOLDER_API_KEY: &str = "demo";

/// Environment variable consulted when the config file carries no API key
pub const API_KEY_ENV: &str = "WEATHER_API_KEY";

/// Result of config validation, as `field: message` lines
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, field: &str, message: impl std::fmt::Display) {
        self.errors.push(format!("{field}: {message}"));
    }

    fn warning(&mut self, field: &str, message: impl std::fmt::Display) {
        self.warnings.push(format!("{field}: {message}"));
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// Weather API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Preference storage settings
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the weather API (without trailing endpoint)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key. Falls back to `WEATHER_API_KEY`, then to the placeholder.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Number of forecast days requested
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u8,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_forecast_days() -> u8 {
    5
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            forecast_days: default_forecast_days(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiConfig {
    /// The key sent with every request: config, then environment, then "demo".
    pub fn effective_api_key(&self) -> String {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .map(str::to_string)
            .or_else(|| {
                std::env::var(API_KEY_ENV)
                    .ok()
                    .filter(|k| !k.trim().is_empty())
            })
            .unwrap_or_else(|| PLACEHOLDER_API_KEY.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// File name (inside the config directory) holding persisted preferences
    #[serde(default = "default_preferences_file")]
    pub preferences_file: String,
}

fn default_preferences_file() -> String {
    "preferences.json".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            preferences_file: default_preferences_file(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("weatherdash");

        Self {
            config_dir,
            api: ApiConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Config {
    /// Load `config.toml` from the user config directory.
    ///
    /// A missing file is created with defaults. If the directory is missing or
    /// read-only the defaults are used for this run only.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::warn!("No user config directory, using default configuration");
                Ok(Self::default())
            }
        }
    }

    /// Load from an explicit path. Only an existing file that cannot be read
    /// or parsed is an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Self::default();
            if let Err(e) = config.save_to(path) {
                tracing::warn!("Could not create {}: {}", path.display(), e);
            }
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// [`Config::load`] followed by [`Config::validated`]
    pub fn load_validated() -> Result<Self, ConfigError> {
        Self::load()?.validated()
    }

    /// Reject a config with validation errors; log its warnings.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let validation = self.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.errors.join("; ")));
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok(self)
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        match Url::parse(&self.api.base_url) {
            Ok(url) if url.scheme() != "http" && url.scheme() != "https" => {
                result.error(
                    "api.base_url",
                    format!("URL must use http or https scheme, got: {}", url.scheme()),
                );
            }
            Ok(url) if url.host().is_none() => result.error("api.base_url", "URL must have a host"),
            Ok(_) => {}
            Err(e) => result.error("api.base_url", format!("Invalid URL: {e}")),
        }

        if self.api.timeout_secs == 0 {
            result.error("api.timeout_secs", "Timeout must be greater than 0");
        } else if self.api.timeout_secs > 120 {
            result.warning("api.timeout_secs", "Timeout is unusually long (>120s)");
        }

        if self.api.forecast_days == 0 {
            result.error("api.forecast_days", "At least one forecast day is required");
        } else if self.api.forecast_days > 14 {
            result.warning(
                "api.forecast_days",
                "The weather API serves at most 14 forecast days",
            );
        }

        // A missing key is not fatal; the first request reports invalidApiKey
        if self.api.effective_api_key() == PLACEHOLDER_API_KEY {
            result.warning(
                "api.api_key",
                format!("No API key configured (set {API_KEY_ENV}); using placeholder"),
            );
        }

        if self.storage.preferences_file.trim().is_empty() {
            result.error("storage.preferences_file", "File name cannot be empty");
        }

        result
    }

    /// Path of the preferences file
    pub fn preferences_path(&self) -> PathBuf {
        self.config_dir.join(&self.storage.preferences_file)
    }

    /// Write to `config.toml` in the user config directory
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    fn config_path() -> Option<PathBuf> {
        Some(dirs::config_dir()?.join("weatherdash").join("config.toml"))
    }
}
