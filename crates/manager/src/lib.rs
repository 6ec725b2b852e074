//! Color scheme manager for termscheme.
//!
//! Finds scheme files in the configured directories, loads them on first
//! use and hands out shared, immutable [`ColorScheme`] handles. Schemes
//! created or modified by the application are saved back to the user
//! directory.
//!
//! [`ColorScheme`]: termscheme_scheme::ColorScheme

mod locator;
mod manager;

pub use locator::{DirectoryLocator, SchemeLocator};
pub use manager::{SchemeManager, SchemeOrigin};
