//! Cash plus holdings ledger.

use std::collections::BTreeMap;

use super::position::Position;

/// Positions keyed by symbol, plus the cash balance.
///
/// A `BTreeMap` keeps iteration order stable so persisted files are
/// reproducible. Mutate positions through [`crate::domain::accounting`].
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    pub cash: f64,
    pub positions: BTreeMap<String, Position>,
}

impl Ledger {
    pub fn new(start_capital: f64) -> Self {
        Ledger {
            cash: start_capital,
            positions: BTreeMap::new(),
        }
    }

    /// Builds a ledger whose cash is whatever the holdings did not consume.
    pub fn with_derived_cash(start_capital: f64, positions: Vec<Position>) -> Self {
        let mut ledger = Ledger::new(start_capital);
        for position in positions {
            ledger.positions.insert(position.symbol.clone(), position);
        }
        ledger.cash = start_capital - ledger.book_value();
        ledger
    }

    pub fn get_position(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol)
    }

    pub fn has_position(&self, symbol: &str) -> bool {
        self.positions.contains_key(symbol)
    }

    pub fn held_shares(&self, symbol: &str) -> f64 {
        self.positions.get(symbol).map(|p| p.shares).unwrap_or(0.0)
    }

    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Sum of the denormalized `book_value` column.
    pub fn book_value(&self) -> f64 {
        self.positions.values().map(|p| p.book_value).sum()
    }

    pub fn total_shares(&self) -> f64 {
        self.positions.values().map(|p| p.shares).sum()
    }

    /// Cash plus holdings at cost.
    pub fn equity_at_cost(&self) -> f64 {
        self.cash + self.book_value()
    }
}
