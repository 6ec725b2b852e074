//! Configuration structures for termscheme settings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{defaults, xdg};

/// Application configuration with nested sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Color scheme discovery settings
    #[serde(default)]
    pub schemes: SchemeSettings,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Where color schemes are looked up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemeSettings {
    /// Writable directory for user schemes (defaults to the XDG data dir)
    #[serde(default)]
    pub user_dir: Option<String>,

    /// Read-only directories with bundled schemes, searched in order
    #[serde(default = "default_system_dirs")]
    pub system_dirs: Vec<String>,

    /// Scheme selected at startup (empty means the built-in default)
    #[serde(default)]
    pub default_scheme: String,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log file path (optional)
    #[serde(default)]
    pub file_path: Option<String>,

    /// Minimum log level (debug, info, warn, error)
    #[serde(default = "default_min_level")]
    pub min_level: String,

    /// Number of recent log entries kept in memory
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl SchemeSettings {
    /// Writable scheme directory: the configured one, or
    /// `<data dir>/color-schemes`.
    pub fn user_dir(&self) -> Option<PathBuf> {
        match &self.user_dir {
            Some(dir) => Some(PathBuf::from(dir)),
            None => xdg::get_schemes_dir().ok(),
        }
    }

    /// Read-only scheme directories.
    pub fn system_dirs(&self) -> Vec<PathBuf> {
        self.system_dirs.iter().map(PathBuf::from).collect()
    }
}

impl LoggingSettings {
    pub fn file_path(&self) -> Option<PathBuf> {
        self.file_path.as_ref().map(PathBuf::from)
    }
}

// Default value functions for serde
fn default_system_dirs() -> Vec<String> {
    defaults::SYSTEM_SCHEME_DIRS
        .iter()
        .map(|dir| dir.to_string())
        .collect()
}

fn default_min_level() -> String {
    defaults::MIN_LOG_LEVEL.to_string()
}

fn default_max_entries() -> usize {
    defaults::MAX_LOG_ENTRIES
}

// Default implementations
impl Default for SchemeSettings {
    fn default() -> Self {
        Self {
            user_dir: None,
            system_dirs: default_system_dirs(),
            default_scheme: String::new(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file_path: None,
            min_level: default_min_level(),
            max_entries: default_max_entries(),
        }
    }
}
