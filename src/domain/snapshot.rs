//! Performance snapshots, one per valuation run and date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    pub date: NaiveDate,
    pub cash: f64,
    /// Holdings at the latest available price.
    pub portfolio_value: f64,
    pub total_equity: f64,
    pub total_unrealized_pl: f64,
    pub winning_positions: usize,
    pub losing_positions: usize,
}

impl PerformanceSnapshot {
    /// Snapshot of an untouched account: all cash.
    pub fn all_cash(date: NaiveDate, cash: f64) -> Self {
        PerformanceSnapshot {
            date,
            cash,
            portfolio_value: 0.0,
            total_equity: cash,
            total_unrealized_pl: 0.0,
            winning_positions: 0,
            losing_positions: 0,
        }
    }
}
