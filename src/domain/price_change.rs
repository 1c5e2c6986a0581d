//! Price history and lookback-window percentage change.

use chrono::NaiveDate;
use std::collections::HashMap;

/// One adjusted close.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub adjusted_close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, adjusted_close: f64) -> Self {
        PricePoint {
            date,
            adjusted_close,
        }
    }

    pub fn is_usable(&self) -> bool {
        self.adjusted_close.is_finite() && self.adjusted_close > 0.0
    }
}

/// Per-symbol change over the window and the last usable price.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSignals {
    changes: HashMap<String, f64>,
    latest: HashMap<String, f64>,
}

impl PriceSignals {
    pub fn insert(&mut self, symbol: &str, change_pct: f64, latest_price: f64) {
        self.changes.insert(symbol.to_string(), change_pct);
        self.latest.insert(symbol.to_string(), latest_price);
    }

    pub fn change(&self, symbol: &str) -> Option<f64> {
        self.changes.get(symbol).copied()
    }

    pub fn latest(&self, symbol: &str) -> Option<f64> {
        self.latest.get(symbol).copied()
    }

    pub fn latest_prices(&self) -> &HashMap<String, f64> {
        &self.latest
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// (last - first) / first * 100 over the usable points of a time-ordered
/// history. `None` with fewer than two usable points.
pub fn percent_change(history: &[PricePoint]) -> Option<f64> {
    let mut usable = history.iter().filter(|p| p.is_usable());
    let first = usable.next()?;
    let last = usable.last()?;
    Some((last.adjusted_close - first.adjusted_close) / first.adjusted_close * 100.0)
}

pub fn latest_price(history: &[PricePoint]) -> Option<f64> {
    history
        .iter()
        .rev()
        .find(|p| p.is_usable())
        .map(|p| p.adjusted_close)
}

/// Turn fetched histories into signals. Symbols whose history cannot produce
/// a change are left out.
pub fn build_signals(histories: &HashMap<String, Vec<PricePoint>>) -> PriceSignals {
    let mut signals = PriceSignals::default();
    for (symbol, history) in histories {
        let mut ordered = history.clone();
        ordered.sort_by_key(|p| p.date);
        if let (Some(change), Some(price)) = (percent_change(&ordered), latest_price(&ordered)) {
            signals.insert(symbol, change, price);
        }
    }
    signals
}
