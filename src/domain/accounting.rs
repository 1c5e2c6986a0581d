//! Position accounting: weighted-average cost buys, partial and full sells.
//!
//! Only one average-cost lot is tracked per symbol. Every function validates
//! its inputs before touching the ledger, so an `Err` leaves it unchanged.
//! Cash is the caller's concern.

use chrono::NaiveDate;

use super::error::PapertraderError;
use super::ledger::Ledger;
use super::position::{Position, SHARE_EPSILON};

fn validate_order(symbol: &str, quantity: f64, price: f64) -> Result<(), PapertraderError> {
    if symbol.trim().is_empty() {
        return Err(PapertraderError::InvalidOrder {
            symbol: symbol.to_string(),
            reason: "symbol must not be empty".into(),
        });
    }
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(PapertraderError::InvalidOrder {
            symbol: symbol.to_string(),
            reason: format!("quantity must be positive, got {quantity}"),
        });
    }
    if !price.is_finite() || price <= 0.0 {
        return Err(PapertraderError::InvalidOrder {
            symbol: symbol.to_string(),
            reason: format!("price must be positive, got {price}"),
        });
    }
    Ok(())
}

/// Open a position or add to an existing one.
///
/// new_avg = (old_shares * old_avg + quantity * price) / (old_shares + quantity)
pub fn open_or_increase(
    ledger: &mut Ledger,
    symbol: &str,
    quantity: f64,
    price: f64,
    trade_date: NaiveDate,
) -> Result<(), PapertraderError> {
    validate_order(symbol, quantity, price)?;

    match ledger.positions.get_mut(symbol) {
        Some(position) => {
            let new_shares = position.shares + quantity;
            let new_avg = (position.shares * position.avg_price + quantity * price) / new_shares;
            position.shares = new_shares;
            position.avg_price = new_avg;
            position.book_value = new_shares * new_avg;
            position.last_buy_date = Some(trade_date);
        }
        None => {
            ledger.positions.insert(
                symbol.to_string(),
                Position::open(symbol, quantity, price, trade_date),
            );
        }
    }
    Ok(())
}

/// Sell `quantity` shares of `symbol` at `price`.
///
/// The average cost is left as is. The position is dropped once its share
/// count falls to [`SHARE_EPSILON`] or below. Returns the realized P/L,
/// `quantity * (price - avg_price)`, which the ledger itself does not keep.
pub fn reduce_or_close(
    ledger: &mut Ledger,
    symbol: &str,
    quantity: f64,
    price: f64,
    trade_date: NaiveDate,
) -> Result<f64, PapertraderError> {
    validate_order(symbol, quantity, price)?;

    let held = ledger.held_shares(symbol);
    let position = match ledger.positions.get_mut(symbol) {
        Some(position) if quantity <= position.shares + SHARE_EPSILON => position,
        _ => {
            return Err(PapertraderError::InsufficientPosition {
                symbol: symbol.to_string(),
                requested: quantity,
                held,
            });
        }
    };

    let realized_pl = quantity * (price - position.avg_price);
    position.shares -= quantity;
    position.book_value = position.shares * position.avg_price;
    position.last_sell_date = Some(trade_date);

    if position.is_closed() {
        ledger.positions.remove(symbol);
    }

    Ok(realized_pl)
}

/// Reset every `book_value` to `shares * avg_price`.
pub fn recompute_book_values(ledger: &mut Ledger) {
    for position in ledger.positions.values_mut() {
        position.book_value = position.book_cost();
    }
}
