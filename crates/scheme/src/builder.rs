//! Mutation interface shared by the scheme file readers.

use crate::{ColorEntry, RandomizationRange, SchemeError};

/// Target of a scheme reader.
///
/// Readers only tokenize and validate their input; every change to the
/// scheme under construction goes through this trait.
pub trait SchemeBuilder {
    fn set_entry(&mut self, index: usize, entry: ColorEntry) -> Result<(), SchemeError>;
    fn set_range(&mut self, index: usize, range: RandomizationRange) -> Result<(), SchemeError>;
    fn set_description(&mut self, description: String);
    fn set_opacity(&mut self, opacity: f64);
    fn set_randomized_background(&mut self, randomize: bool);
}
