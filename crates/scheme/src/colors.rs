//! Color value types: RGB/HSV colors, palette entries and randomization ranges.

use std::fmt;

/// Number of slots in a color table.
///
/// The table holds:
/// - 2 default colors (foreground, background)
/// - 8 standard ANSI colors
/// - 8 intense ANSI colors
pub const TABLE_COLORS: usize = 18;

/// Slot of the default foreground color.
pub const FOREGROUND_INDEX: usize = 0;
/// Slot of the default background color.
pub const BACKGROUND_INDEX: usize = 1;

/// Largest hue randomization span. Kept below 360 so that opposite ends
/// of the span never land on the same hue.
pub const MAX_HUE: u16 = 340;

/// 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert to HSV.
    ///
    /// Hue is in degrees `[0, 360)`, saturation and value in `[0, 255]`.
    /// Achromatic colors report hue 0.
    pub fn to_hsv(self) -> Hsv {
        let r = f64::from(self.r);
        let g = f64::from(self.g);
        let b = f64::from(self.b);

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let saturation = if max == 0.0 {
            0.0
        } else {
            (delta * 255.0 / max).round()
        };

        let hue = if delta == 0.0 {
            0.0
        } else if max == r {
            60.0 * ((g - b) / delta)
        } else if max == g {
            60.0 * ((b - r) / delta + 2.0)
        } else {
            60.0 * ((r - g) / delta + 4.0)
        };

        let hue = hue.round().rem_euclid(360.0);

        Hsv {
            hue: hue as u16,
            saturation: saturation as u8,
            value: max as u8,
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<Rgb> for ratatui::style::Color {
    fn from(rgb: Rgb) -> Self {
        ratatui::style::Color::Rgb(rgb.r, rgb.g, rgb.b)
    }
}

/// HSV color with integer channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Hsv {
    /// Hue in degrees, `[0, 360)`
    pub hue: u16,
    /// Saturation, `[0, 255]`
    pub saturation: u8,
    /// Value (brightness), `[0, 255]`
    pub value: u8,
}

impl Hsv {
    pub const fn new(hue: u16, saturation: u8, value: u8) -> Self {
        Self {
            hue,
            saturation,
            value,
        }
    }

    /// Convert back to RGB. Hues outside `[0, 360)` are wrapped.
    pub fn to_rgb(self) -> Rgb {
        let h = f64::from(self.hue % 360) / 60.0;
        let s = f64::from(self.saturation) / 255.0;
        let v = f64::from(self.value) / 255.0;

        let chroma = v * s;
        let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
        let m = v - chroma;

        let (r, g, b) = match h as u8 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };

        let channel = |c: f64| ((c + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Rgb::new(channel(r), channel(g), channel(b))
    }
}

/// Bold setting of a palette entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontWeight {
    /// Always draw bold
    Bold,
    /// Never draw bold
    Normal,
    /// Keep whatever weight the text already has
    #[default]
    Inherit,
}

/// One slot of a color table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColorEntry {
    /// Base color
    pub color: Rgb,
    /// Bold override
    pub weight: FontWeight,
    /// Whether the cell background shows through
    pub transparent: bool,
}

impl ColorEntry {
    pub const fn new(color: Rgb, transparent: bool, weight: FontWeight) -> Self {
        Self {
            color,
            weight,
            transparent,
        }
    }

    /// Opaque entry that inherits the current weight.
    pub const fn plain(color: Rgb) -> Self {
        Self::new(color, false, FontWeight::Inherit)
    }
}

/// How far a slot's color may drift when the table is randomized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RandomizationRange {
    /// Hue span in degrees, at most [`MAX_HUE`]
    pub hue: u16,
    /// Saturation span, `[0, 255]`
    pub saturation: u8,
    /// Value span, `[0, 255]`
    pub value: u8,
}

impl RandomizationRange {
    /// Range that disables randomization.
    pub const NULL: Self = Self {
        hue: 0,
        saturation: 0,
        value: 0,
    };

    /// Create a range, clamping the hue span to [`MAX_HUE`].
    pub fn new(hue: u16, saturation: u8, value: u8) -> Self {
        Self {
            hue: hue.min(MAX_HUE),
            saturation,
            value,
        }
    }

    pub fn is_null(&self) -> bool {
        self.hue == 0 && self.saturation == 0 && self.value == 0
    }
}

/// Built-in palette used until a scheme customizes a slot.
pub(crate) static DEFAULT_TABLE: [ColorEntry; TABLE_COLORS] = [
    // Foreground, background
    ColorEntry::new(Rgb::new(0x00, 0x00, 0x00), false, FontWeight::Inherit),
    ColorEntry::new(Rgb::new(0xFF, 0xFF, 0xFF), true, FontWeight::Inherit),
    // Standard colors
    ColorEntry::plain(Rgb::new(0x00, 0x00, 0x00)),
    ColorEntry::plain(Rgb::new(0xB2, 0x18, 0x18)),
    ColorEntry::plain(Rgb::new(0x18, 0xB2, 0x18)),
    ColorEntry::plain(Rgb::new(0xB2, 0x68, 0x18)),
    ColorEntry::plain(Rgb::new(0x18, 0x18, 0xB2)),
    ColorEntry::plain(Rgb::new(0xB2, 0x18, 0xB2)),
    ColorEntry::plain(Rgb::new(0x18, 0xB2, 0xB2)),
    ColorEntry::plain(Rgb::new(0xB2, 0xB2, 0xB2)),
    // Intense colors
    ColorEntry::plain(Rgb::new(0x68, 0x68, 0x68)),
    ColorEntry::plain(Rgb::new(0xFF, 0x54, 0x54)),
    ColorEntry::plain(Rgb::new(0x54, 0xFF, 0x54)),
    ColorEntry::plain(Rgb::new(0xFF, 0xFF, 0x54)),
    ColorEntry::plain(Rgb::new(0x54, 0x54, 0xFF)),
    ColorEntry::plain(Rgb::new(0xFF, 0x54, 0xFF)),
    ColorEntry::plain(Rgb::new(0x54, 0xFF, 0xFF)),
    ColorEntry::plain(Rgb::new(0xFF, 0xFF, 0xFF)),
];

/// Section names used by the key/value scheme format.
static COLOR_NAMES: [&str; TABLE_COLORS] = [
    "Color0", "Color1", "Color2", "Color3", "Color4", "Color5", "Color6", "Color7", "Color8",
    "Color9", "Color10", "Color11", "Color12", "Color13", "Color14", "Color15", "Color16",
    "Color17",
];

static TRANSLATED_COLOR_NAMES: [&str; TABLE_COLORS] = [
    "Foreground",
    "Background",
    "Color 1",
    "Color 2",
    "Color 3",
    "Color 4",
    "Color 5",
    "Color 6",
    "Color 7",
    "Color 8",
    "Color 1 (Intense)",
    "Color 2 (Intense)",
    "Color 3 (Intense)",
    "Color 4 (Intense)",
    "Color 5 (Intense)",
    "Color 6 (Intense)",
    "Color 7 (Intense)",
    "Color 8 (Intense)",
];

/// Stable machine name of a slot, as written in scheme files.
pub fn color_name_for_index(index: usize) -> Option<&'static str> {
    COLOR_NAMES.get(index).copied()
}

/// Human-readable name of a slot.
pub fn translated_color_name_for_index(index: usize) -> Option<&'static str> {
    TRANSLATED_COLOR_NAMES.get(index).copied()
}
