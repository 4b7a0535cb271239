//! # Settings Loader
//!
//! Loads the tracker configuration from `settings.json`: where the months
//! database lives, the defaults offered when a new month is entered, the
//! optional activity log and the CSV export directory.
//!
//! Every key is optional; anything missing takes the value from
//! [`Settings::default`]. The `FLAT_MONEY_DATABASE` environment variable,
//! when set, overrides `database_path`.
//!
//! ## Usage Examples
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//!
//! // Load settings from a specific path
//! let settings = settings_loader::load_settings("config/my_settings.json")?;
//!
//! // Use the given file if it can be read, then ./settings.json, then defaults
//! let path = Some(PathBuf::from("settings.json"));
//! let settings = settings_loader::load_settings_with_fallback(path.as_ref());
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
pub use models::Settings;

pub const DEFAULT_SETTINGS_FILE: &str = "settings.json";
pub const DATABASE_ENV_VAR: &str = "FLAT_MONEY_DATABASE";

/// Loads settings from a JSON file
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Reading settings file: {}", path.display()))?;
    let settings: Settings = serde_json::from_str(&raw)
        .with_context(|| format!("Parsing settings JSON in {}", path.display()))?;
    Ok(apply_env_overrides(settings))
}

/// Loads settings from the default location (settings.json in the current directory)
pub fn load_default_settings() -> Result<Settings> {
    load_settings(DEFAULT_SETTINGS_FILE)
}

/// Tries the provided path, then the default location, then built-in
/// defaults. A file that exists but cannot be parsed is logged and skipped.
pub fn load_settings_with_fallback(path: Option<&PathBuf>) -> Settings {
    if let Some(settings_path) = path {
        match load_settings(settings_path) {
            Ok(settings) => return settings,
            Err(err) => tracing::warn!("{:#}; falling back", err),
        }
    }

    if settings_file_exists(DEFAULT_SETTINGS_FILE) {
        match load_default_settings() {
            Ok(settings) => return settings,
            Err(err) => tracing::warn!("{:#}; using built-in defaults", err),
        }
    }

    apply_env_overrides(Settings::default())
}

/// Checks if a settings file exists at the given path
pub fn settings_file_exists<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().exists() && path.as_ref().is_file()
}

fn apply_env_overrides(mut settings: Settings) -> Settings {
    if let Ok(db) = std::env::var(DATABASE_ENV_VAR) {
        if !db.trim().is_empty() {
            settings.database_path = PathBuf::from(db);
        }
    }
    settings
}
