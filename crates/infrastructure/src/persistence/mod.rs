//! Local persistence.

mod settings_repository;

pub use settings_repository::{API_URL_ENV, SettingsError, SettingsRepository, UPLOAD_URL_ENV};
