//! Trade log port trait.

use crate::domain::error::PapertraderError;
use crate::domain::trade::TradeRecord;

/// Append-only history of executed trades.
pub trait TradeLog {
    fn append(&self, trades: &[TradeRecord]) -> Result<(), PapertraderError>;
    fn read_all(&self) -> Result<Vec<TradeRecord>, PapertraderError>;
}
