//! Market data port trait.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::domain::error::PapertraderError;
use crate::domain::price_change::PricePoint;

pub trait PriceFeed {
    /// Adjusted-close history for `symbols` over `[start, end]`.
    ///
    /// Symbols with no data are left out of the map rather than failing the
    /// whole call.
    fn get_history(
        &self,
        symbols: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HashMap<String, Vec<PricePoint>>, PapertraderError>;

    /// Best-effort latest price per symbol.
    fn get_latest(&self, symbols: &[String]) -> Result<HashMap<String, f64>, PapertraderError>;
}
