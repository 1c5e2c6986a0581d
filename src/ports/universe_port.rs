//! Stock universe port trait.

use crate::domain::error::PapertraderError;

pub trait UniverseProvider {
    /// Ordered, normalized symbols to evaluate.
    fn get_symbols(&self) -> Result<Vec<String>, PapertraderError>;
}
