//! Error type for scheme construction and reading.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::TABLE_COLORS;

#[derive(Debug, Error)]
pub enum SchemeError {
    /// The scheme file could not be opened or read.
    #[error("cannot read color scheme {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The underlying line stream failed mid-read.
    #[error("color scheme stream failed: {0}")]
    Stream(#[from] io::Error),

    #[error("color table index {index} out of range (table has {} slots)", TABLE_COLORS)]
    IndexOutOfRange { index: usize },

    /// The file extension names neither scheme format.
    #[error("unsupported color scheme format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
}
