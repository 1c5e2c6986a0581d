//! Threshold strategy: buy fixed dollar amounts on drops, trim on gains.

use chrono::NaiveDate;
use tracing::debug;

use super::accounting::{open_or_increase, recompute_book_values, reduce_or_close};
use super::error::PapertraderError;
use super::ledger::Ledger;
use super::price_change::PriceSignals;
use super::trade::{TradeAction, TradeRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    /// Dollars spent per BUY.
    pub buy_amount: f64,
    /// Upper bound in dollars per SELL.
    pub sell_amount: f64,
    /// BUY when the lookback change is at or below this percentage (negative).
    pub drop_pct: f64,
    /// SELL when the lookback change is at or above this percentage.
    pub gain_pct: f64,
    pub lookback_days: i64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig {
            buy_amount: 5.0,
            sell_amount: 10.0,
            drop_pct: -5.0,
            gain_pct: 10.0,
            lookback_days: 7,
        }
    }
}

/// What happened to each symbol during one pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    pub trades: Vec<TradeRecord>,
    pub realized_pl: f64,
    /// Symbols with no usable price data. Distinct from a hold.
    pub no_data: Vec<String>,
    /// Symbols that had data but did not meet either threshold.
    pub holds: Vec<String>,
}

impl Evaluation {
    pub fn buys(&self) -> usize {
        self.trades
            .iter()
            .filter(|t| t.action == TradeAction::Buy)
            .count()
    }

    pub fn sells(&self) -> usize {
        self.trades
            .iter()
            .filter(|t| t.action == TradeAction::Sell)
            .count()
    }
}

/// Run one evaluation pass over `universe`, in order.
///
/// Per symbol, at most one action:
/// 1. BUY `buy_amount` worth if change <= drop_pct and cash covers it
/// 2. else SELL min(sell_amount / price, held) if change >= gain_pct and held
/// 3. else hold
///
/// Symbols without a change or latest price are skipped and listed in
/// [`Evaluation::no_data`]. The pass runs on a working copy and is committed
/// to `ledger` only if every fill succeeds.
pub fn evaluate(
    ledger: &mut Ledger,
    universe: &[String],
    signals: &PriceSignals,
    config: &StrategyConfig,
    trade_date: NaiveDate,
) -> Result<Evaluation, PapertraderError> {
    let mut working = ledger.clone();
    let mut evaluation = Evaluation::default();

    for symbol in universe {
        let (change, price) = match (signals.change(symbol), signals.latest(symbol)) {
            (Some(change), Some(price)) => (change, price),
            _ => {
                debug!(symbol = %symbol, "no price data, skipping");
                evaluation.no_data.push(symbol.clone());
                continue;
            }
        };

        if change <= config.drop_pct && working.cash >= config.buy_amount {
            let quantity = config.buy_amount / price;
            open_or_increase(&mut working, symbol, quantity, price, trade_date)?;
            working.cash -= config.buy_amount;
            evaluation.trades.push(TradeRecord {
                date: trade_date,
                symbol: symbol.clone(),
                action: TradeAction::Buy,
                quantity,
                price,
                cash_after: working.cash,
            });
        } else if change >= config.gain_pct && working.has_position(symbol) {
            let quantity = (config.sell_amount / price).min(working.held_shares(symbol));
            let realized = reduce_or_close(&mut working, symbol, quantity, price, trade_date)?;
            working.cash += quantity * price;
            evaluation.realized_pl += realized;
            evaluation.trades.push(TradeRecord {
                date: trade_date,
                symbol: symbol.clone(),
                action: TradeAction::Sell,
                quantity,
                price,
                cash_after: working.cash,
            });
        } else {
            evaluation.holds.push(symbol.clone());
        }
    }

    recompute_book_values(&mut working);
    *ledger = working;
    Ok(evaluation)
}
