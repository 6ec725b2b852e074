//! Color scheme: a named palette with optional per-slot randomization.

use std::path::Path;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::colors::DEFAULT_TABLE;
use crate::modern::ModernSchemeReader;
use crate::{
    ColorEntry, Hsv, RandomizationRange, Rgb, SchemeBuilder, SchemeError, BACKGROUND_INDEX,
    FOREGROUND_INDEX, TABLE_COLORS,
};

/// Name of the built-in scheme.
pub const DEFAULT_SCHEME_NAME: &str = "Default";

/// Backgrounds with an HSV value below this are considered dark.
const DARK_BACKGROUND_THRESHOLD: u8 = 127;

/// Palette storage: the shared built-in table until the first slot is customized.
#[derive(Debug, Clone, PartialEq)]
enum ColorTable {
    Default,
    Custom(Box<[ColorEntry; TABLE_COLORS]>),
}

impl ColorTable {
    fn entries(&self) -> &[ColorEntry; TABLE_COLORS] {
        match self {
            ColorTable::Default => &DEFAULT_TABLE,
            ColorTable::Custom(table) => table,
        }
    }

    /// Mutable palette, copying the built-in table on first use.
    fn entries_mut(&mut self) -> &mut [ColorEntry; TABLE_COLORS] {
        match self {
            ColorTable::Custom(table) => table,
            ColorTable::Default => {
                *self = ColorTable::Custom(Box::new(DEFAULT_TABLE));
                self.entries_mut()
            }
        }
    }
}

/// Color scheme for a terminal display.
///
/// Holds the palette used to draw text and cell backgrounds, the opacity of
/// the display background and, optionally, how far each slot may drift when
/// a randomized table is requested.
///
/// Schemes are mutated while being built. Once shared (the manager hands
/// them out as `Arc<ColorScheme>`), they are read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScheme {
    name: String,
    description: String,
    opacity: f64,
    table: ColorTable,
    random_table: Option<Box<[RandomizationRange; TABLE_COLORS]>>,
    randomized_background: bool,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            opacity: 1.0,
            table: ColorTable::Default,
            random_table: None,
            randomized_background: false,
        }
    }
}

impl ColorScheme {
    /// Create a scheme using the built-in palette.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in default scheme.
    pub fn built_in() -> Self {
        let mut scheme = Self::new();
        scheme.set_name(DEFAULT_SCHEME_NAME);
        scheme.set_description(DEFAULT_SCHEME_NAME);
        scheme
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Opacity of the display background, from 0 (transparent) to 1 (opaque).
    ///
    /// Stored as given; callers clamp before use.
    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = opacity;
    }

    /// Whether the background slot takes part in randomization.
    pub fn randomized_background_color(&self) -> bool {
        self.randomized_background
    }

    pub fn set_randomized_background_color(&mut self, randomize: bool) {
        self.randomized_background = randomize;
    }

    /// Whether no slot has been customized.
    pub fn is_default_table(&self) -> bool {
        matches!(self.table, ColorTable::Default)
    }

    /// Set a single palette slot.
    pub fn set_color_table_entry(
        &mut self,
        index: usize,
        entry: ColorEntry,
    ) -> Result<(), SchemeError> {
        check_index(index)?;
        self.table.entries_mut()[index] = entry;
        Ok(())
    }

    /// Set how far slot `index` may drift when randomized.
    ///
    /// The hue span is clamped to [`crate::MAX_HUE`].
    pub fn set_randomization_range(
        &mut self,
        index: usize,
        hue: u16,
        saturation: u8,
        value: u8,
    ) -> Result<(), SchemeError> {
        check_index(index)?;
        let table = self
            .random_table
            .get_or_insert_with(|| Box::new([RandomizationRange::NULL; TABLE_COLORS]));
        table[index] = RandomizationRange::new(hue, saturation, value);
        Ok(())
    }

    /// Randomization range of slot `index`; null when the slot is not randomized.
    pub fn randomization_range(&self, index: usize) -> Option<RandomizationRange> {
        if index >= TABLE_COLORS {
            return None;
        }
        Some(
            self.random_table
                .as_ref()
                .map_or(RandomizationRange::NULL, |table| table[index]),
        )
    }

    /// Base (non-randomized) palette.
    pub fn base_table(&self) -> &[ColorEntry; TABLE_COLORS] {
        self.table.entries()
    }

    /// Compute the palette for `seed`.
    pub fn color_table(&self, seed: u32) -> [ColorEntry; TABLE_COLORS] {
        let mut table = *self.table.entries();
        self.fill_color_table(&mut table, seed);
        table
    }

    /// Write the palette for `seed` into `table`.
    ///
    /// Slots without a randomization range are copied unchanged. The same
    /// scheme and seed always produce the same table.
    pub fn fill_color_table(&self, table: &mut [ColorEntry; TABLE_COLORS], seed: u32) {
        for (index, slot) in table.iter_mut().enumerate() {
            *slot = self.compute_entry(index, seed);
        }
    }

    /// Palette slot `index` for `seed`, or `None` if the index is out of range.
    pub fn color_entry(&self, index: usize, seed: u32) -> Option<ColorEntry> {
        (index < TABLE_COLORS).then(|| self.compute_entry(index, seed))
    }

    /// Base foreground color.
    pub fn foreground_color(&self) -> Rgb {
        self.table.entries()[FOREGROUND_INDEX].color
    }

    /// Base background color.
    pub fn background_color(&self) -> Rgb {
        self.table.entries()[BACKGROUND_INDEX].color
    }

    /// True if the background has an HSV value below 127.
    pub fn has_dark_background(&self) -> bool {
        self.background_color().to_hsv().value < DARK_BACKGROUND_THRESHOLD
    }

    /// Read the key/value scheme format from `path` into this scheme.
    ///
    /// The whole file is read before anything is applied, so on error the
    /// scheme is left untouched. Malformed fields are skipped.
    pub fn read(&mut self, path: &Path) -> Result<(), SchemeError> {
        let reader = ModernSchemeReader::from_path(path)?;
        reader.read_into(self);
        Ok(())
    }

    fn compute_entry(&self, index: usize, seed: u32) -> ColorEntry {
        let base = self.table.entries()[index];

        let Some(random_table) = self.random_table.as_ref() else {
            return base;
        };
        let range = random_table[index];
        if range.is_null() || (index == BACKGROUND_INDEX && !self.randomized_background) {
            return base;
        }

        let mut rng = slot_rng(seed, index);
        let hsv = base.color.to_hsv();

        let hue = (i32::from(hsv.hue) + spread(&mut rng, range.hue)).rem_euclid(360);
        let saturation =
            (i32::from(hsv.saturation) + spread(&mut rng, u16::from(range.saturation))).clamp(0, 255);
        let value = (i32::from(hsv.value) + spread(&mut rng, u16::from(range.value))).clamp(0, 255);

        ColorEntry {
            color: Hsv::new(hue as u16, saturation as u8, value as u8).to_rgb(),
            ..base
        }
    }
}

impl SchemeBuilder for ColorScheme {
    fn set_entry(&mut self, index: usize, entry: ColorEntry) -> Result<(), SchemeError> {
        self.set_color_table_entry(index, entry)
    }

    fn set_range(&mut self, index: usize, range: RandomizationRange) -> Result<(), SchemeError> {
        self.set_randomization_range(index, range.hue, range.saturation, range.value)
    }

    fn set_description(&mut self, description: String) {
        self.description = description;
    }

    fn set_opacity(&mut self, opacity: f64) {
        self.opacity = opacity;
    }

    fn set_randomized_background(&mut self, randomize: bool) {
        self.randomized_background = randomize;
    }
}

fn check_index(index: usize) -> Result<(), SchemeError> {
    if index < TABLE_COLORS {
        Ok(())
    } else {
        Err(SchemeError::IndexOutOfRange { index })
    }
}

/// Generator for one slot, seeded from the `(seed, index)` pair.
///
/// ChaCha8 has a fixed output stream, so palettes stay the same across
/// `rand` releases.
fn slot_rng(seed: u32, index: usize) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64((u64::from(seed) << 32) | index as u64)
}

/// Uniform offset in `[-span / 2, span / 2]`.
fn spread(rng: &mut ChaCha8Rng, span: u16) -> i32 {
    let half = i32::from(span) / 2;
    if half == 0 {
        0
    } else {
        rng.gen_range(-half..=half)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FontWeight, MAX_HUE};

    fn randomized_scheme() -> ColorScheme {
        let mut scheme = ColorScheme::new();
        scheme
            .set_color_table_entry(2, ColorEntry::plain(Rgb::new(200, 40, 40)))
            .unwrap();
        scheme.set_randomization_range(2, 60, 80, 80).unwrap();
        scheme
    }

    #[test]
    fn test_new_uses_default_table() {
        let scheme = ColorScheme::new();
        assert!(scheme.is_default_table());
        assert_eq!(scheme.opacity(), 1.0);
        assert_eq!(scheme.base_table(), &DEFAULT_TABLE);
        assert!(!scheme.randomized_background_color());
    }

    #[test]
    fn test_set_entry_materializes_custom_table() {
        let mut scheme = ColorScheme::new();
        let entry = ColorEntry::new(Rgb::new(1, 2, 3), true, FontWeight::Bold);
        scheme.set_color_table_entry(5, entry).unwrap();

        assert!(!scheme.is_default_table());
        assert_eq!(scheme.base_table()[5], entry);
        // Other slots keep the defaults
        assert_eq!(scheme.base_table()[4], DEFAULT_TABLE[4]);
        assert_eq!(scheme.base_table()[6], DEFAULT_TABLE[6]);
    }

    #[test]
    fn test_out_of_range_index_is_an_error() {
        let mut scheme = ColorScheme::new();
        let result = scheme.set_color_table_entry(TABLE_COLORS, ColorEntry::default());
        assert!(matches!(
            result,
            Err(SchemeError::IndexOutOfRange { index: TABLE_COLORS })
        ));
        assert!(scheme.set_randomization_range(99, 1, 1, 1).is_err());
        assert!(scheme.is_default_table());
        assert_eq!(scheme.color_entry(TABLE_COLORS, 0), None);
        assert_eq!(scheme.randomization_range(TABLE_COLORS), None);
    }

    #[test]
    fn test_unrandomized_slots_equal_base_for_any_seed() {
        let scheme = randomized_scheme();
        for seed in [0, 1, 42, u32::MAX] {
            for index in 0..TABLE_COLORS {
                if index == 2 {
                    continue;
                }
                assert_eq!(
                    scheme.color_entry(index, seed),
                    Some(scheme.base_table()[index])
                );
            }
        }
    }

    #[test]
    fn test_no_random_table_returns_base_table() {
        let scheme = ColorScheme::new();
        assert_eq!(&scheme.color_table(12345), scheme.base_table());
    }

    #[test]
    fn test_randomization_is_deterministic() {
        let scheme = randomized_scheme();
        let first = scheme.color_table(7);
        let second = scheme.color_table(7);
        assert_eq!(first, second);
        assert_eq!(scheme.color_entry(2, 7), Some(first[2]));

        let copy = scheme.clone();
        assert_eq!(copy.color_table(7), first);
    }

    #[test]
    fn test_randomization_varies_with_seed() {
        let scheme = randomized_scheme();
        let base = scheme.base_table()[2].color;
        let distinct: std::collections::HashSet<Rgb> = (0..16)
            .filter_map(|seed| scheme.color_entry(2, seed))
            .map(|entry| entry.color)
            .collect();
        assert!(distinct.len() > 1);
        assert!(distinct.iter().any(|color| *color != base));
    }

    #[test]
    fn test_randomization_stays_within_range() {
        let scheme = randomized_scheme();
        let base = scheme.base_table()[2].color.to_hsv();
        for seed in 0..64 {
            let hsv = scheme.color_entry(2, seed).unwrap().color.to_hsv();
            // Allow a couple of units for integer rounding in the conversion
            let hue_diff = (i32::from(hsv.hue) - i32::from(base.hue)).rem_euclid(360);
            let hue_diff = hue_diff.min(360 - hue_diff);
            assert!(hue_diff <= 30 + 2, "hue drifted by {hue_diff}");
            assert!((i32::from(hsv.value) - i32::from(base.value)).abs() <= 40 + 2);
        }
    }

    #[test]
    fn test_randomization_keeps_flags() {
        let mut scheme = ColorScheme::new();
        let entry = ColorEntry::new(Rgb::new(10, 200, 10), true, FontWeight::Bold);
        scheme.set_color_table_entry(3, entry).unwrap();
        scheme.set_randomization_range(3, MAX_HUE, 0, 0).unwrap();

        let randomized = scheme.color_entry(3, 99).unwrap();
        assert!(randomized.transparent);
        assert_eq!(randomized.weight, FontWeight::Bold);
    }

    #[test]
    fn test_randomized_values_are_stable() {
        let mut scheme = ColorScheme::new();
        scheme
            .set_color_table_entry(2, ColorEntry::plain(Rgb::new(128, 128, 128)))
            .unwrap();
        scheme.set_randomization_range(2, 0, 0, 100).unwrap();

        assert_eq!(scheme.color_entry(2, 7).unwrap().color, Rgb::new(134, 134, 134));
        assert_eq!(scheme.color_entry(2, 0).unwrap().color, Rgb::new(97, 97, 97));
    }

    #[test]
    fn test_value_is_clamped_not_wrapped() {
        let mut scheme = ColorScheme::new();
        scheme
            .set_color_table_entry(4, ColorEntry::plain(Rgb::new(250, 250, 250)))
            .unwrap();
        scheme
            .set_color_table_entry(5, ColorEntry::plain(Rgb::new(5, 5, 5)))
            .unwrap();
        scheme.set_randomization_range(4, 0, 0, 255).unwrap();
        scheme.set_randomization_range(5, 0, 0, 255).unwrap();

        let bright: Vec<Hsv> = (0..64)
            .map(|seed| scheme.color_entry(4, seed).unwrap().color.to_hsv())
            .collect();
        // Offsets reach +127, so 250 has to saturate at the top
        assert!(bright.iter().all(|hsv| hsv.value >= 250 - 127));
        assert!(bright.iter().any(|hsv| hsv.value == 255));

        let dark: Vec<Hsv> = (0..64)
            .map(|seed| scheme.color_entry(5, seed).unwrap().color.to_hsv())
            .collect();
        assert!(dark.iter().all(|hsv| hsv.value <= 5 + 127));
        assert!(dark.iter().any(|hsv| hsv.value == 0));
    }

    #[test]
    fn test_saturation_is_clamped() {
        let mut scheme = ColorScheme::new();
        scheme
            .set_color_table_entry(6, ColorEntry::plain(Rgb::new(255, 5, 5)))
            .unwrap();
        scheme.set_randomization_range(6, 0, 255, 0).unwrap();

        let saturations: Vec<u8> = (0..64)
            .map(|seed| scheme.color_entry(6, seed).unwrap().color.to_hsv().saturation)
            .collect();
        assert!(saturations.iter().all(|s| *s >= 250 - 127 - 2));
        assert!(saturations.contains(&255));
    }

    #[test]
    fn test_background_randomization_needs_flag() {
        let mut scheme = ColorScheme::new();
        scheme
            .set_color_table_entry(BACKGROUND_INDEX, ColorEntry::plain(Rgb::new(40, 40, 160)))
            .unwrap();
        scheme
            .set_randomization_range(BACKGROUND_INDEX, 200, 100, 100)
            .unwrap();

        let base = scheme.base_table()[BACKGROUND_INDEX];
        for seed in 0..8 {
            assert_eq!(scheme.color_entry(BACKGROUND_INDEX, seed), Some(base));
        }

        scheme.set_randomized_background_color(true);
        let changed = (0..8)
            .filter_map(|seed| scheme.color_entry(BACKGROUND_INDEX, seed))
            .any(|entry| entry != base);
        assert!(changed);
    }

    #[test]
    fn test_hue_wraps_around() {
        let mut scheme = ColorScheme::new();
        // Hue 0: any negative offset has to wrap to the top of the circle
        scheme
            .set_color_table_entry(2, ColorEntry::plain(Rgb::new(255, 0, 0)))
            .unwrap();
        scheme.set_randomization_range(2, MAX_HUE, 0, 0).unwrap();
        for seed in 0..32 {
            let hsv = scheme.color_entry(2, seed).unwrap().color.to_hsv();
            assert!(hsv.hue < 360);
            assert_eq!(hsv.value, 255);
        }
    }

    #[test]
    fn test_foreground_and_background_ignore_randomization() {
        let mut scheme = ColorScheme::new();
        scheme.set_randomized_background_color(true);
        scheme
            .set_randomization_range(BACKGROUND_INDEX, 300, 255, 255)
            .unwrap();
        assert_eq!(scheme.background_color(), DEFAULT_TABLE[BACKGROUND_INDEX].color);
        assert_eq!(scheme.foreground_color(), DEFAULT_TABLE[FOREGROUND_INDEX].color);
    }

    #[test]
    fn test_has_dark_background_boundary() {
        let mut scheme = ColorScheme::new();
        assert!(!scheme.has_dark_background());

        scheme
            .set_color_table_entry(BACKGROUND_INDEX, ColorEntry::plain(Rgb::new(127, 127, 127)))
            .unwrap();
        assert!(!scheme.has_dark_background());

        scheme
            .set_color_table_entry(BACKGROUND_INDEX, ColorEntry::plain(Rgb::new(126, 20, 20)))
            .unwrap();
        assert!(scheme.has_dark_background());
    }

    #[test]
    fn test_clone_is_deep() {
        let original = randomized_scheme();
        let mut copy = original.clone();
        copy.set_color_table_entry(2, ColorEntry::plain(Rgb::new(0, 0, 0)))
            .unwrap();
        copy.set_randomization_range(2, 0, 0, 0).unwrap();

        assert_eq!(original.base_table()[2].color, Rgb::new(200, 40, 40));
        assert!(!original.randomization_range(2).unwrap().is_null());
    }

    #[test]
    fn test_built_in_scheme() {
        let scheme = ColorScheme::built_in();
        assert_eq!(scheme.name(), DEFAULT_SCHEME_NAME);
        assert!(scheme.is_default_table());
    }
}
