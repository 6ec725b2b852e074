//! Reader for the legacy line-oriented `.schema` format.
//!
//! Only the palette (`color`) and description (`title`) lines are supported.
//! Other directives, such as background images, are ignored.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;

use crate::{ColorEntry, ColorScheme, FontWeight, Rgb, SchemeBuilder, SchemeError, TABLE_COLORS};

/// Why a `color` line was rejected.
#[derive(Debug, Error, PartialEq)]
enum LineError {
    #[error("expected 7 fields, found {0}")]
    FieldCount(usize),
    #[error("{field} '{value}' is not a number")]
    NotANumber { field: &'static str, value: String },
    #[error("{field} {value} is out of range")]
    OutOfRange { field: &'static str, value: i64 },
}

/// Reads a legacy color scheme from a line stream.
pub struct LegacySchemeReader<R> {
    reader: R,
}

impl LegacySchemeReader<BufReader<File>> {
    /// Open a `.schema` file.
    pub fn from_path(path: &Path) -> Result<Self, SchemeError> {
        let file = File::open(path).map_err(|source| SchemeError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> LegacySchemeReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Read every line and build a scheme from the recognized ones.
    ///
    /// Fails only if the stream itself fails; malformed lines are skipped.
    pub fn read(self) -> Result<ColorScheme, SchemeError> {
        let mut scheme = ColorScheme::new();
        self.read_into(&mut scheme)?;
        Ok(scheme)
    }

    /// Apply every recognized line to `builder`.
    pub fn read_into<B: SchemeBuilder>(mut self, builder: &mut B) -> Result<(), SchemeError> {
        let mut buf = Vec::new();
        let mut line_no = 0;

        loop {
            buf.clear();
            if self.reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line_no += 1;

            // Old files are not always UTF-8
            let line = String::from_utf8_lossy(&buf);
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (keyword, rest) = match line.split_once(char::is_whitespace) {
                Some((keyword, rest)) => (keyword, rest.trim()),
                None => (line, ""),
            };

            match keyword {
                "color" => match parse_color_line(rest) {
                    Ok((index, entry)) => {
                        if let Err(e) = builder.set_entry(index, entry) {
                            log::warn!("Skipping color line {}: {}", line_no, e);
                        }
                    }
                    Err(e) => log::warn!("Skipping color line {}: {} ({})", line_no, e, line),
                },
                "title" => {
                    if rest.is_empty() {
                        log::warn!("Skipping empty title on line {}", line_no);
                    } else {
                        builder.set_description(rest.to_string());
                    }
                }
                _ => log::debug!("Unsupported legacy scheme directive on line {}: {}", line_no, line),
            }
        }

        Ok(())
    }
}

/// Parse `<index> <r> <g> <b> <transparent> <bold>`.
fn parse_color_line(fields: &str) -> Result<(usize, ColorEntry), LineError> {
    let fields: Vec<&str> = fields.split_whitespace().collect();
    if fields.len() != 6 {
        // Count the keyword too, as the line is written
        return Err(LineError::FieldCount(fields.len() + 1));
    }

    let index = parse_field("index", fields[0], TABLE_COLORS as i64 - 1)? as usize;
    let red = parse_field("red", fields[1], 255)? as u8;
    let green = parse_field("green", fields[2], 255)? as u8;
    let blue = parse_field("blue", fields[3], 255)? as u8;
    let transparent = parse_field("transparent", fields[4], 1)? != 0;
    let bold = parse_field("bold", fields[5], 1)? != 0;

    let weight = if bold {
        FontWeight::Bold
    } else {
        FontWeight::Inherit
    };

    Ok((
        index,
        ColorEntry::new(Rgb::new(red, green, blue), transparent, weight),
    ))
}

/// Parse an integer in `[0, max]`.
fn parse_field(field: &'static str, value: &str, max: i64) -> Result<i64, LineError> {
    let number: i64 = value.parse().map_err(|_| LineError::NotANumber {
        field,
        value: value.to_string(),
    })?;
    if !(0..=max).contains(&number) {
        return Err(LineError::OutOfRange {
            field,
            value: number,
        });
    }
    Ok(number)
}
