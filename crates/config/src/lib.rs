//! Configuration management for termscheme.
//!
//! This crate provides configuration loading, saving, and validation
//! with support for TOML format and XDG directory conventions.

mod settings;
mod xdg;

pub use settings::{Config, LoggingSettings, SchemeSettings};
pub use xdg::{get_config_dir, get_data_dir, get_schemes_dir};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Default values as constants
pub mod defaults {
    pub const SCHEMES_SUBDIR: &str = "color-schemes";
    pub const SYSTEM_SCHEME_DIRS: &[&str] = &[
        "/usr/local/share/termscheme/color-schemes",
        "/usr/share/termscheme/color-schemes",
    ];
    pub const MIN_LOG_LEVEL: &str = "info";
    pub const MAX_LOG_ENTRIES: usize = 500;
}

impl Config {
    /// Load configuration from the default config file.
    ///
    /// On first run, creates config file with default values.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Load configuration from `path`.
    ///
    /// Creates the file with default values if it does not exist.
    /// Auto-completes missing keys with default values.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run - create config file with default values
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let original_content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::validate_content(&original_content)?;

        // Serialize back to get normalized content
        let normalized_content = toml::to_string_pretty(&config)?;

        // If content changed, save the updated config
        if original_content != normalized_content {
            config.save_to(path)?;
        }

        Ok(config)
    }

    /// Save configuration to the default config file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    /// Get path to config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(get_config_dir()?.join("config.toml"))
    }

    /// Validate config content.
    pub fn validate_content(content: &str) -> Result<Config> {
        toml::from_str(content).map_err(|e| anyhow::anyhow!("{}", e))
    }
}
