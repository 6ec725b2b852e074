//! Color schemes for termscheme.
//!
//! Provides the palette model ([`ColorScheme`]), deterministic per-seed
//! randomization of palette slots, and readers for the two scheme file
//! formats: the key/value `.colorscheme` format and the legacy line-based
//! `.schema` format.

mod builder;
mod colors;
mod error;
pub mod keyvalue;
mod legacy;
mod modern;
mod scheme;

pub use builder::SchemeBuilder;
pub use colors::{
    color_name_for_index, translated_color_name_for_index, ColorEntry, FontWeight, Hsv,
    RandomizationRange, Rgb, BACKGROUND_INDEX, FOREGROUND_INDEX, MAX_HUE, TABLE_COLORS,
};
pub use error::SchemeError;
pub use legacy::LegacySchemeReader;
pub use modern::{write_modern, ModernSchemeReader};
pub use scheme::{ColorScheme, DEFAULT_SCHEME_NAME};

use std::path::Path;

/// File extension of the key/value format.
pub const MODERN_EXTENSION: &str = "colorscheme";
/// File extension of the legacy line format.
pub const LEGACY_EXTENSION: &str = "schema";

/// On-disk scheme format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemeFormat {
    /// Key/value `.colorscheme` files
    Modern,
    /// Line-based `.schema` files
    Legacy,
}

impl SchemeFormat {
    /// Detect the format from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            MODERN_EXTENSION => Some(SchemeFormat::Modern),
            LEGACY_EXTENSION => Some(SchemeFormat::Legacy),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            SchemeFormat::Modern => MODERN_EXTENSION,
            SchemeFormat::Legacy => LEGACY_EXTENSION,
        }
    }
}

/// Load a scheme file of either format.
///
/// The scheme is named after the file's base name. Legacy files without a
/// title use that name as description.
pub fn load_scheme(path: &Path) -> Result<ColorScheme, SchemeError> {
    let format = SchemeFormat::from_path(path)
        .ok_or_else(|| SchemeError::UnsupportedFormat(path.to_path_buf()))?;

    let mut scheme = match format {
        SchemeFormat::Modern => ModernSchemeReader::from_path(path)?.read(),
        SchemeFormat::Legacy => LegacySchemeReader::from_path(path)?.read()?,
    };

    let name = scheme_name(path).unwrap_or_default();
    if format == SchemeFormat::Legacy && scheme.description().is_empty() {
        scheme.set_description(name.clone());
    }
    scheme.set_name(name);

    Ok(scheme)
}

/// Scheme name for a file: its base name without extension.
pub fn scheme_name(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
}
