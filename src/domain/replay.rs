//! Rebuild a ledger from the trade log and check it against the stored one.

use super::accounting::{open_or_increase, recompute_book_values, reduce_or_close};
use super::error::PapertraderError;
use super::ledger::Ledger;
use super::trade::{TradeAction, TradeRecord};

const AUDIT_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub struct Replay {
    pub start_capital: f64,
    pub ledger: Ledger,
    pub realized_pl: f64,
    pub trades_applied: usize,
}

/// Apply every record, in log order, to a fresh ledger.
///
/// Cash follows the fills (BUY debits notional, SELL credits notional). The
/// recorded `cash_after` is not trusted; [`audit`] compares it separately.
pub fn replay(start_capital: f64, trades: &[TradeRecord]) -> Result<Replay, PapertraderError> {
    let mut ledger = Ledger::new(start_capital);
    let mut realized_pl = 0.0;

    for trade in trades {
        match trade.action {
            TradeAction::Buy => {
                open_or_increase(&mut ledger, &trade.symbol, trade.quantity, trade.price, trade.date)?;
                ledger.cash -= trade.notional();
            }
            TradeAction::Sell => {
                realized_pl +=
                    reduce_or_close(&mut ledger, &trade.symbol, trade.quantity, trade.price, trade.date)?;
                ledger.cash += trade.notional();
            }
        }
    }

    recompute_book_values(&mut ledger);
    Ok(Replay {
        start_capital,
        ledger,
        realized_pl,
        trades_applied: trades.len(),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum Discrepancy {
    Cash { stored: f64, replayed: f64 },
    CashAfter { index: usize, recorded: f64, replayed: f64 },
    MissingInLedger { symbol: String },
    MissingInReplay { symbol: String },
    Shares { symbol: String, stored: f64, replayed: f64 },
    AvgPrice { symbol: String, stored: f64, replayed: f64 },
}

fn differs(a: f64, b: f64) -> bool {
    (a - b).abs() > AUDIT_TOLERANCE * a.abs().max(b.abs()).max(1.0)
}

/// Compare a stored ledger with the replay of its trade log.
pub fn audit(stored: &Ledger, trades: &[TradeRecord], replayed: &Replay) -> Vec<Discrepancy> {
    let mut found = Vec::new();

    if differs(stored.cash, replayed.ledger.cash) {
        found.push(Discrepancy::Cash {
            stored: stored.cash,
            replayed: replayed.ledger.cash,
        });
    }

    let mut running = replayed.start_capital;
    for (index, trade) in trades.iter().enumerate() {
        running += match trade.action {
            TradeAction::Buy => -trade.notional(),
            TradeAction::Sell => trade.notional(),
        };
        if differs(trade.cash_after, running) {
            found.push(Discrepancy::CashAfter {
                index,
                recorded: trade.cash_after,
                replayed: running,
            });
        }
    }

    for (symbol, position) in &stored.positions {
        match replayed.ledger.get_position(symbol) {
            None => found.push(Discrepancy::MissingInReplay {
                symbol: symbol.clone(),
            }),
            Some(other) => {
                if differs(position.shares, other.shares) {
                    found.push(Discrepancy::Shares {
                        symbol: symbol.clone(),
                        stored: position.shares,
                        replayed: other.shares,
                    });
                }
                if differs(position.avg_price, other.avg_price) {
                    found.push(Discrepancy::AvgPrice {
                        symbol: symbol.clone(),
                        stored: position.avg_price,
                        replayed: other.avg_price,
                    });
                }
            }
        }
    }

    for symbol in replayed.ledger.positions.keys() {
        if !stored.has_position(symbol) {
            found.push(Discrepancy::MissingInLedger {
                symbol: symbol.clone(),
            });
        }
    }

    found
}
