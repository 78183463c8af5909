//! Centralized error types for the weatherdash application.
//!
//! Configuration and weather failures carry a user-facing message; storage
//! failures are only ever logged.

use thiserror::Error;

/// Top-level application error type.
///
/// Errors that reach the CLI are converted to this type and reported with
/// `user_message()`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Weather service error: {0}")]
    Weather(#[from] WeatherError),
}

impl AppError {
    /// Returns a user-friendly message suitable for display in the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Config(e) => e.user_message(),
            AppError::Weather(e) => e.user_message(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("No user config directory on this platform")]
    NoConfigDir,

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Io(_) | ConfigError::NoConfigDir => {
                "The configuration file could not be accessed."
            }
            ConfigError::Parse(_) => "Configuration file is malformed. Check your settings.",
            ConfigError::Serialize(_) | ConfigError::Invalid(_) => {
                "Invalid configuration. Check your settings."
            }
        }
    }
}

/// Preference storage errors.
///
/// These never reach the user through the settings or weather state: storage
/// failures are logged and the value is kept in memory instead.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to write preferences: {0}")]
    WriteFailed(String),

    #[error("Stored preferences are corrupt: {0}")]
    Corrupt(String),
}

/// Weather service errors.
///
/// The three variants are the complete set of failure codes the weather
/// store ever reports.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("City not found: {0}")]
    CityNotFound(String),

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Failed to fetch weather data: {0}")]
    FetchFailed(String),
}

impl WeatherError {
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::CityNotFound(_) => "City not found",
            WeatherError::InvalidApiKey => "Weather API key is invalid. Check settings.",
            WeatherError::FetchFailed(_) => "Failed to fetch weather data",
        }
    }
}
