//! Reader and writer for the key/value `.colorscheme` format.
//!
//! ```text
//! [General]
//! Description=Dark Pastels
//! Opacity=1
//!
//! [Color0]
//! Color=220,220,204
//! Bold=true
//! MaxRandomHue=40
//! ```

use std::path::Path;
use std::str::FromStr;

use crate::keyvalue::{parse_bool, KeyValueFile};
use crate::{
    color_name_for_index, ColorEntry, ColorScheme, FontWeight, RandomizationRange, Rgb,
    SchemeBuilder, SchemeError, BACKGROUND_INDEX, MAX_HUE, TABLE_COLORS,
};

const GENERAL_SECTION: &str = "General";
const DEFAULT_DESCRIPTION: &str = "Un-named Color Scheme";

const KEY_DESCRIPTION: &str = "Description";
const KEY_OPACITY: &str = "Opacity";
const KEY_RANDOMIZED_BACKGROUND: &str = "RandomizedBackgroundColor";
const KEY_COLOR: &str = "Color";
const KEY_TRANSPARENCY: &str = "Transparency";
const KEY_BOLD: &str = "Bold";
const KEY_MAX_RANDOM_HUE: &str = "MaxRandomHue";
const KEY_MAX_RANDOM_SATURATION: &str = "MaxRandomSaturation";
const KEY_MAX_RANDOM_VALUE: &str = "MaxRandomValue";

/// Reads a color scheme from a parsed key/value document.
pub struct ModernSchemeReader {
    file: KeyValueFile,
}

impl ModernSchemeReader {
    /// Parse document text.
    pub fn new(content: &str) -> Self {
        Self::from_file(KeyValueFile::parse(content))
    }

    pub fn from_file(file: KeyValueFile) -> Self {
        Self { file }
    }

    /// Read and parse a `.colorscheme` file.
    ///
    /// Invalid UTF-8 is replaced rather than rejected, so only the affected
    /// values are lost.
    pub fn from_path(path: &Path) -> Result<Self, SchemeError> {
        let bytes = std::fs::read(path).map_err(|source| SchemeError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(&String::from_utf8_lossy(&bytes)))
    }

    /// Build a scheme from the document.
    pub fn read(&self) -> ColorScheme {
        let mut scheme = ColorScheme::new();
        self.read_into(&mut scheme);
        scheme
    }

    /// Apply the document to `builder`. Malformed fields are skipped.
    pub fn read_into<B: SchemeBuilder>(&self, builder: &mut B) {
        let description = self
            .file
            .get(GENERAL_SECTION, KEY_DESCRIPTION)
            .unwrap_or(DEFAULT_DESCRIPTION);
        builder.set_description(description.to_string());

        if let Some(opacity) = self.field::<f64>(GENERAL_SECTION, KEY_OPACITY) {
            if opacity.is_finite() {
                builder.set_opacity(opacity);
            } else {
                log::warn!("Ignoring non-finite opacity {}", opacity);
            }
        }

        let explicit_background = self.bool_field(GENERAL_SECTION, KEY_RANDOMIZED_BACKGROUND);
        if let Some(randomize) = explicit_background {
            builder.set_randomized_background(randomize);
        }

        for index in 0..TABLE_COLORS {
            let Some(section) = color_name_for_index(index) else {
                continue;
            };
            if !self.file.has_section(section) {
                continue;
            }

            self.read_color_entry(builder, index, section);

            let range = self.read_randomization_range(section);
            if range.is_null() {
                continue;
            }
            if let Err(e) = builder.set_range(index, range) {
                log::warn!("Skipping randomization of [{}]: {}", section, e);
                continue;
            }
            if index == BACKGROUND_INDEX && explicit_background.is_none() {
                builder.set_randomized_background(true);
            }
        }
    }

    fn read_color_entry<B: SchemeBuilder>(&self, builder: &mut B, index: usize, section: &str) {
        let Some(raw) = self.file.get(section, KEY_COLOR) else {
            log::debug!("[{}] has no {} key", section, KEY_COLOR);
            return;
        };
        let Some(color) = parse_rgb(raw) else {
            log::warn!("Skipping [{}]: malformed color '{}'", section, raw);
            return;
        };

        let transparent = self.bool_field(section, KEY_TRANSPARENCY).unwrap_or(false);
        let weight = match self.bool_field(section, KEY_BOLD) {
            Some(true) => FontWeight::Bold,
            Some(false) => FontWeight::Normal,
            None => FontWeight::Inherit,
        };

        if let Err(e) = builder.set_entry(index, ColorEntry::new(color, transparent, weight)) {
            log::warn!("Skipping [{}]: {}", section, e);
        }
    }

    fn read_randomization_range(&self, section: &str) -> RandomizationRange {
        let hue = self
            .field::<u16>(section, KEY_MAX_RANDOM_HUE)
            .filter(|hue| {
                let valid = *hue <= MAX_HUE;
                if !valid {
                    log::warn!("[{}] {} {} exceeds {}", section, KEY_MAX_RANDOM_HUE, hue, MAX_HUE);
                }
                valid
            })
            .unwrap_or(0);
        let saturation = self
            .field::<u8>(section, KEY_MAX_RANDOM_SATURATION)
            .unwrap_or(0);
        let value = self.field::<u8>(section, KEY_MAX_RANDOM_VALUE).unwrap_or(0);

        RandomizationRange::new(hue, saturation, value)
    }

    /// Parsed value of an optional key; malformed values are logged and dropped.
    fn field<T: FromStr>(&self, section: &str, key: &str) -> Option<T> {
        let raw = self.file.get(section, key)?;
        match raw.trim().parse() {
            Ok(value) => Some(value),
            Err(_) => {
                log::warn!("Ignoring malformed [{}] {}='{}'", section, key, raw);
                None
            }
        }
    }

    fn bool_field(&self, section: &str, key: &str) -> Option<bool> {
        let raw = self.file.get(section, key)?;
        let value = parse_bool(raw);
        if value.is_none() {
            log::warn!("Ignoring malformed [{}] {}='{}'", section, key, raw);
        }
        value
    }
}

/// Parse `r,g,b`.
fn parse_rgb(value: &str) -> Option<Rgb> {
    let mut channels = value.split(',').map(|c| c.trim().parse::<u8>());
    let r = channels.next()?.ok()?;
    let g = channels.next()?.ok()?;
    let b = channels.next()?.ok()?;
    if channels.next().is_some() {
        return None;
    }
    Some(Rgb::new(r, g, b))
}

/// Serialize a scheme in the key/value format.
///
/// Every slot is written. Randomization keys appear only for randomized
/// slots and `Bold` only when the slot overrides the weight.
pub fn write_modern(scheme: &ColorScheme) -> String {
    let mut file = KeyValueFile::new();

    file.set(GENERAL_SECTION, KEY_DESCRIPTION, scheme.description());
    file.set(GENERAL_SECTION, KEY_OPACITY, scheme.opacity().to_string());
    file.set(
        GENERAL_SECTION,
        KEY_RANDOMIZED_BACKGROUND,
        scheme.randomized_background_color().to_string(),
    );

    for (index, entry) in scheme.base_table().iter().enumerate() {
        let Some(section) = color_name_for_index(index) else {
            continue;
        };
        let color = entry.color;
        file.set(
            section,
            KEY_COLOR,
            format!("{},{},{}", color.r, color.g, color.b),
        );
        file.set(section, KEY_TRANSPARENCY, entry.transparent.to_string());
        match entry.weight {
            FontWeight::Bold => file.set(section, KEY_BOLD, "true"),
            FontWeight::Normal => file.set(section, KEY_BOLD, "false"),
            FontWeight::Inherit => {}
        }

        if let Some(range) = scheme.randomization_range(index).filter(|r| !r.is_null()) {
            file.set(section, KEY_MAX_RANDOM_HUE, range.hue.to_string());
            file.set(section, KEY_MAX_RANDOM_SATURATION, range.saturation.to_string());
            file.set(section, KEY_MAX_RANDOM_VALUE, range.value.to_string());
        }
    }

    file.to_string()
}
