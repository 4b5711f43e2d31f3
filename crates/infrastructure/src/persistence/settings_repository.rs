//! Client settings persistence.
//!
//! Stores settings in the platform-specific config directory:
//! - Linux: ~/.config/gather/settings.json
//! - macOS: ~/Library/Application Support/gather/settings.json
//! - Windows: %APPDATA%/gather/settings.json

use std::path::{Path, PathBuf};

use gather_domain::ClientSettings;
use tokio::fs;

use crate::serialization::{SerializationError, from_json_bytes, to_json_stable_bytes};

/// Environment variable overriding `api_url`.
pub const API_URL_ENV: &str = "GATHER_API_URL";
/// Environment variable overriding `upload_base_url`.
pub const UPLOAD_URL_ENV: &str = "GATHER_UPLOAD_URL";

/// Error type for settings operations.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    /// Could not determine config directory.
    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Repository for client settings.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    path: Option<PathBuf>,
}

impl Default for SettingsRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsRepository {
    /// Repository backed by the platform config directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            path: dirs::config_dir().map(|dir| dir.join("gather").join("settings.json")),
        }
    }

    /// Repository backed by an explicit file.
    #[must_use]
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Returns the path where settings are stored, if available.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Loads settings from disk.
    ///
    /// Returns default settings if the file doesn't exist. Missing fields
    /// take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load(&self) -> Result<ClientSettings, SettingsError> {
        let Some(path) = &self.path else {
            tracing::debug!("no config directory, using default settings");
            return Ok(ClientSettings::default());
        };

        if !fs::try_exists(path).await? {
            tracing::debug!(path = %path.display(), "settings file not found, using defaults");
            return Ok(ClientSettings::default());
        }

        let content = fs::read(path).await?;
        let settings = from_json_bytes(&content)?;
        tracing::debug!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    /// Loads settings and applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file cannot be read or parsed.
    pub async fn load_with_env(&self) -> Result<ClientSettings, SettingsError> {
        let settings = self.load().await?;
        Ok(apply_overrides(settings, |name| std::env::var(name).ok()))
    }

    /// Saves settings to disk, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if no location is known or the write fails.
    pub async fn save(&self, settings: &ClientSettings) -> Result<(), SettingsError> {
        let Some(path) = &self.path else {
            return Err(SettingsError::NoConfigDir);
        };

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).await?;
        }

        let content = to_json_stable_bytes(settings)?;
        fs::write(path, content).await?;
        tracing::info!(path = %path.display(), "settings saved");
        Ok(())
    }
}

/// Applies URL overrides looked up through `lookup`.
fn apply_overrides<F>(mut settings: ClientSettings, lookup: F) -> ClientSettings
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.is_empty()) {
        settings.api_url = url;
    }
    if let Some(url) = lookup(UPLOAD_URL_ENV).filter(|v| !v.is_empty()) {
        settings.upload_base_url = url;
    }
    settings
}
