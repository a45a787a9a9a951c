use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::preview::DEFAULT_DEBOUNCE_MS;
use crate::theme::Theme;

/// Persisted settings. Keys this version does not know are kept and
/// written back unchanged.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, alias = "current_theme", skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_working_folder: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debounce_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub themes_dir: Option<PathBuf>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Settings {
    /// Merge two layers; values set in `other` win.
    pub fn union(&self, other: &Self) -> Self {
        let mut extra = self.extra.clone();
        extra.extend(other.extra.clone());
        Self {
            theme: other.theme.clone().or_else(|| self.theme.clone()),
            last_working_folder: other
                .last_working_folder
                .clone()
                .or_else(|| self.last_working_folder.clone()),
            debounce_ms: other.debounce_ms.or(self.debounce_ms),
            themes_dir: other
                .themes_dir
                .clone()
                .or_else(|| self.themes_dir.clone()),
            extra,
        }
    }

    pub fn theme_or_default(&self) -> Theme {
        self.theme.clone().unwrap_or_default()
    }

    pub fn debounce_delay(&self) -> u64 {
        self.debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS)
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("livemark").join("config.json");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("livemark")
                .join("config.json");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("livemark").join("config.json");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("livemark")
                .join("config.json");
        }
    }

    local_override_path()
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".livemark.json")
}

/// Read settings from `path`; a missing file yields defaults.
pub fn load_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(Settings::default());
    }
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config {}", path.display()))
}

/// Global settings overlaid with the local override file.
pub fn load_layered(global: &Path, local: &Path) -> Result<Settings> {
    let global = load_settings(global)?;
    let local = load_settings(local)?;
    Ok(global.union(&local))
}

pub fn save_settings(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(settings).context("Failed to serialize config")?;
    fs::write(path, format!("{json}\n"))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_settings(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}
