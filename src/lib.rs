//! Terminal color schemes: loading, randomization and management.
//!
//! This crate ties the workspace together. Applications usually load a
//! [`Config`], call [`init_logging`] once and then work with the
//! [`SchemeManager`] returned by [`open_manager`]:
//!
//! ```no_run
//! let config = termscheme::Config::load().unwrap_or_default();
//! termscheme::init_logging(&config);
//!
//! let mut manager = termscheme::open_manager(&config);
//! let scheme = termscheme::startup_scheme(&mut manager, &config);
//! let palette = scheme.color_table(42);
//! ```

use std::str::FromStr;
use std::sync::Arc;

pub use termscheme_config::{Config, LoggingSettings, SchemeSettings};
pub use termscheme_logger::{LogEntry, LogLevel};
pub use termscheme_manager::{DirectoryLocator, SchemeLocator, SchemeManager, SchemeOrigin};
pub use termscheme_scheme::*;

/// Install the logger described by the `[logging]` config section.
///
/// Unknown levels fall back to `info`. Returns `false` if a logger was
/// already installed.
pub fn init_logging(config: &Config) -> bool {
    let min_level = LogLevel::from_str(&config.logging.min_level).unwrap_or_else(|e| {
        eprintln!("{}, using info", e);
        LogLevel::Info
    });

    termscheme_logger::init(
        config.logging.file_path(),
        config.logging.max_entries,
        min_level,
    )
}

/// Create a scheme manager over the directories from the `[schemes]`
/// config section.
pub fn open_manager(config: &Config) -> SchemeManager {
    let locator = DirectoryLocator::new(config.schemes.user_dir(), config.schemes.system_dirs());
    log::debug!("Scheme directories: {:?}", locator);
    SchemeManager::new(locator)
}

/// The scheme selected by `default_scheme`, or the built-in default if it
/// is unset or cannot be loaded.
pub fn startup_scheme(manager: &mut SchemeManager, config: &Config) -> Arc<ColorScheme> {
    let name = config.schemes.default_scheme.as_str();
    manager.find_color_scheme(name).unwrap_or_else(|| {
        log::warn!("Color scheme '{}' not found, using the default", name);
        manager.default_color_scheme()
    })
}
