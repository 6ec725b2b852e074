//! XDG Base Directory support for termscheme.

use anyhow::{Context, Result};
use std::path::PathBuf;

const APP_NAME: &str = "termscheme";

/// Get the configuration directory following XDG conventions.
///
/// Returns `$XDG_CONFIG_HOME/termscheme` or `~/.config/termscheme`.
pub fn get_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|p| p.join(APP_NAME))
        .context("Failed to determine config directory")
}

/// Get the data directory following XDG conventions.
///
/// Returns `$XDG_DATA_HOME/termscheme` or `~/.local/share/termscheme`.
pub fn get_data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|p| p.join(APP_NAME))
        .context("Failed to determine data directory")
}

/// Get the directory holding user color schemes.
///
/// Returns `<data dir>/color-schemes`.
pub fn get_schemes_dir() -> Result<PathBuf> {
    Ok(get_data_dir()?.join(crate::defaults::SCHEMES_SUBDIR))
}
