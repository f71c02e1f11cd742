//! Settings file storage.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;

use super::Settings;

/// Get the settings file path.
pub fn config_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "storyfeed").context("Could not determine config directory")?;

    Ok(dirs.config_dir().join("config.json"))
}

/// Load settings from disk, falling back to defaults when none are stored.
pub fn load() -> Result<Settings> {
    let path = config_path()?;

    if !path.exists() {
        return Ok(Settings::default());
    }

    let json = fs::read_to_string(&path).context("Failed to read config file")?;
    let settings = serde_json::from_str(&json)
        .with_context(|| format!("Invalid config file {}", path.display()))?;
    Ok(settings)
}

/// Save settings to disk.
pub fn save(settings: &Settings) -> Result<PathBuf> {
    let path = config_path()?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).context("Failed to create config directory")?;
    }

    let json = serde_json::to_string_pretty(settings)?;
    fs::write(&path, json).context("Failed to write config file")?;

    tracing::debug!(path = %path.display(), "Saved config");
    Ok(path)
}
