//! Executed trade records, as written to the trade log.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    Buy,
    Sell,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::Buy => f.pad("BUY"),
            TradeAction::Sell => f.pad("SELL"),
        }
    }
}

/// One fill. Never edited once appended to the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub date: NaiveDate,
    pub symbol: String,
    pub action: TradeAction,
    pub quantity: f64,
    pub price: f64,
    pub cash_after: f64,
}

impl TradeRecord {
    pub fn notional(&self) -> f64 {
        self.quantity * self.price
    }
}

impl fmt::Display for TradeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<4} {} {:.4} @ ${:.2}",
            self.action, self.symbol, self.quantity, self.price
        )
    }
}
