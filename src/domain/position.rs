//! Held positions.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Share counts at or below this are treated as a closed position.
pub const SHARE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub shares: f64,
    pub avg_price: f64,
    /// `shares * avg_price`, kept denormalized for cheap summation.
    #[serde(rename = "value")]
    pub book_value: f64,
    pub last_buy_date: Option<NaiveDate>,
    pub last_sell_date: Option<NaiveDate>,
}

impl Position {
    pub fn open(symbol: &str, shares: f64, price: f64, date: NaiveDate) -> Self {
        Position {
            symbol: symbol.to_string(),
            shares,
            avg_price: price,
            book_value: shares * price,
            last_buy_date: Some(date),
            last_sell_date: None,
        }
    }

    pub fn book_cost(&self) -> f64 {
        self.shares * self.avg_price
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.shares * price
    }

    pub fn unrealized_pl(&self, price: f64) -> f64 {
        self.market_value(price) - self.book_cost()
    }

    pub fn is_closed(&self) -> bool {
        self.shares <= SHARE_EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_position() -> Position {
        Position::open("AAA", 2.0, 10.0, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
    }

    #[test]
    fn open_sets_book_value_and_buy_date() {
        let pos = sample_position();
        assert!((pos.book_value - 20.0).abs() < f64::EPSILON);
        assert_eq!(pos.last_buy_date, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(pos.last_sell_date, None);
    }

    #[test]
    fn market_value_and_unrealized_pl() {
        let pos = sample_position();
        assert!((pos.market_value(12.5) - 25.0).abs() < f64::EPSILON);
        assert!((pos.unrealized_pl(12.5) - 5.0).abs() < f64::EPSILON);
        assert!((pos.unrealized_pl(8.0) - (-4.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn unrealized_pl_zero_at_cost() {
        let pos = sample_position();
        assert_eq!(pos.unrealized_pl(pos.avg_price), 0.0);
    }

    #[test]
    fn closed_below_epsilon() {
        let mut pos = sample_position();
        assert!(!pos.is_closed());
        pos.shares = 1e-12;
        assert!(pos.is_closed());
        pos.shares = 0.0;
        assert!(pos.is_closed());
    }
}
