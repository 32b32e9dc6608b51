//! Tool configuration.
//!
//! The [`Config`] struct stores user preferences and the saved custom
//! presets, persisted as TOML (typically at
//! `~/.config/pbir/config.toml` on Unix systems). Filesystem-agnostic
//! loading goes through [`Config::load_from`]/[`Config::save_to`]; the
//! native convenience methods use the platform config directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PbirError, Result};
use crate::fs::FileSystem;
use crate::preset::CustomPreset;

/// User preferences and saved presets
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Report folder to open when none is given on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_report: Option<PathBuf>,

    /// User-saved custom presets
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub presets: Vec<CustomPreset>,
}

impl Config {
    /// Look up a custom preset by id or name
    pub fn preset(&self, id_or_name: &str) -> Option<&CustomPreset> {
        self.presets
            .iter()
            .find(|p| p.id == id_or_name || p.name == id_or_name)
    }

    /// Add a preset, replacing any existing one with the same id
    pub fn add_preset(&mut self, preset: CustomPreset) {
        self.presets.retain(|p| p.id != preset.id);
        self.presets.push(preset);
    }

    /// Remove a preset by id or name, returning it when found
    pub fn remove_preset(&mut self, id_or_name: &str) -> Option<CustomPreset> {
        let index = self
            .presets
            .iter()
            .position(|p| p.id == id_or_name || p.name == id_or_name)?;
        Some(self.presets.remove(index))
    }

    /// Load config from a specific path
    pub fn load_from<FS: FileSystem>(fs: &FS, path: &Path) -> Result<Self> {
        let contents = fs
            .read_to_string(path)
            .map_err(|e| PbirError::FileRead {
                path: path.to_path_buf(),
                source: e,
            })?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save config to a specific path
    pub fn save_to<FS: FileSystem>(&self, fs: &FS, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs.write_file(path, &contents)
            .map_err(|e| PbirError::file_write(path.to_path_buf(), e))?;
        Ok(())
    }

    /// Load from a path, falling back to the default config when the
    /// file does not exist or cannot be parsed
    pub fn load_from_or_default<FS: FileSystem>(fs: &FS, path: &Path) -> Self {
        Self::load_from(fs, path).unwrap_or_default()
    }
}

// ============================================================================
// Native-only implementation (not available in WASM)
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
impl Config {
    /// Get the config file path (~/.config/pbir/config.toml).
    /// Only available on native platforms
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pbir").join("config.toml"))
    }

    /// Load config from the default location, or return the default
    /// config if the file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::config_path()
            && path.exists()
        {
            let contents = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&contents)?;
            return Ok(config);
        }
        Ok(Config::default())
    }

    /// Save config to the default location, creating the config
    /// directory if needed
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path().ok_or(PbirError::NoConfigDir)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;
        Ok(())
    }
}
