use anyhow::Result;
use std::sync::Arc;

use crate::error::AppError;
use crate::settings::{DocumentRoot, Settings};
use crate::storage::{FileStorage, PreferenceStore};
use crate::Config;

/// Application-scoped state and lifecycle manager.
///
/// Owns the single configuration, preference storage and settings instance
/// for the running client. Consumers receive clones of the `Arc`s rather than
/// reaching for globals.
pub struct App {
    config: Arc<Config>,
    storage: Arc<dyn PreferenceStore>,
    document: Arc<DocumentRoot>,
    settings: Arc<Settings>,
}

impl App {
    /// Create a new application instance from the on-disk configuration.
    ///
    /// Fails only when an existing config file is unreadable or invalid.
    pub fn new() -> Result<Self, AppError> {
        Ok(Self::open(Config::load_validated()?))
    }

    /// Build around `config`, keeping preferences next to it
    pub fn open(config: Config) -> Self {
        let storage = Arc::new(FileStorage::open(config.preferences_path()));
        Self::with_parts(config, storage)
    }

    /// Assemble an application from an explicit config and storage backend
    pub fn with_parts(config: Config, storage: Arc<dyn PreferenceStore>) -> Self {
        let document = Arc::new(DocumentRoot::new());
        let settings = Arc::new(Settings::new(storage.clone(), document.clone()));

        Self {
            config: Arc::new(config),
            storage,
            document,
            settings,
        }
    }

    /// Apply persisted settings to the presentation root
    pub fn initialize(&mut self) -> Result<()> {
        tracing::info!("Initializing application");
        self.settings.init();
        tracing::info!("Application initialized successfully");
        Ok(())
    }

    pub fn shutdown(&mut self) -> Result<()> {
        tracing::info!("Shutting down application");
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn storage(&self) -> Arc<dyn PreferenceStore> {
        self.storage.clone()
    }

    pub fn settings(&self) -> Arc<Settings> {
        self.settings.clone()
    }

    pub fn document(&self) -> Arc<DocumentRoot> {
        self.document.clone()
    }
}
