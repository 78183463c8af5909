pub mod app;
pub mod config;
pub mod error;
pub mod settings;
pub mod storage;

pub use app::App;
pub use config::{ApiConfig, Config, StorageConfig};
pub use error::{AppError, ConfigError, StorageError, WeatherError};
pub use settings::{Language, Settings, TextDirection, ThemeMode};
pub use storage::{FileStorage, MemoryStorage, PreferenceStore};

use anyhow::Result;

/// Initialize the core application
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::info!("weatherdash core initialized");
    Ok(())
}
