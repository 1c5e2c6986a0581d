//! Mark-to-market valuation with explicit cost-basis fallback.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

use super::error::PapertraderError;
use super::ledger::Ledger;
use super::snapshot::PerformanceSnapshot;

/// Outcome of asking the price feed for latest quotes.
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteOutcome {
    /// Quotes returned, possibly for only some symbols.
    Available(HashMap<String, f64>),
    /// The feed could not be reached at all.
    Unavailable { reason: String },
}

impl QuoteOutcome {
    pub fn from_fetch(result: Result<HashMap<String, f64>, PapertraderError>) -> Self {
        match result {
            Ok(quotes) => QuoteOutcome::Available(quotes),
            Err(e) => QuoteOutcome::Unavailable {
                reason: e.to_string(),
            },
        }
    }

    fn quote(&self, symbol: &str) -> Option<f64> {
        match self {
            QuoteOutcome::Available(quotes) => quotes.get(symbol).copied(),
            QuoteOutcome::Unavailable { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSource {
    Live,
    Fallback,
}

impl fmt::Display for PriceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceSource::Live => f.pad("LIVE"),
            PriceSource::Fallback => f.pad("FALLBACK"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedPrice {
    pub price: f64,
    pub source: PriceSource,
}

/// The single place a missing or non-numeric quote turns into the cost basis.
pub fn resolve_price(symbol: &str, avg_price: f64, quotes: &QuoteOutcome) -> ResolvedPrice {
    match quotes.quote(symbol) {
        Some(price) if price.is_finite() && price > 0.0 => ResolvedPrice {
            price,
            source: PriceSource::Live,
        },
        other => {
            let err = PapertraderError::MissingPriceData {
                symbol: symbol.to_string(),
            };
            warn!(
                error = %err,
                quote = ?other,
                fallback = avg_price,
                "no live price, valuing at cost basis"
            );
            ResolvedPrice {
                price: avg_price,
                source: PriceSource::Fallback,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Winner,
    Loser,
    Flat,
}

impl Outcome {
    pub fn classify(pl: f64) -> Self {
        if pl > 0.0 {
            Outcome::Winner
        } else if pl < 0.0 {
            Outcome::Loser
        } else {
            Outcome::Flat
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HoldingValuation {
    pub symbol: String,
    pub shares: f64,
    pub avg_price: f64,
    pub book_cost: f64,
    pub current_price: f64,
    pub price_source: PriceSource,
    pub market_value: f64,
    pub unrealized_pl: f64,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Valuation {
    pub snapshot: PerformanceSnapshot,
    pub holdings: Vec<HoldingValuation>,
    pub book_cost: f64,
    pub total_shares: f64,
    pub flat_positions: usize,
    /// True when the feed returned nothing at all and every holding is at cost.
    pub quotes_unavailable: bool,
}

impl Valuation {
    pub fn fallback_symbols(&self) -> Vec<&str> {
        self.holdings
            .iter()
            .filter(|h| h.price_source == PriceSource::Fallback)
            .map(|h| h.symbol.as_str())
            .collect()
    }

    /// Unrealized P/L as a percentage of book cost. Zero with nothing invested.
    pub fn unrealized_pl_pct(&self) -> f64 {
        if self.book_cost > 0.0 {
            self.snapshot.total_unrealized_pl / self.book_cost * 100.0
        } else {
            0.0
        }
    }
}

/// Value every position in `ledger` at its resolved price.
pub fn value_ledger(ledger: &Ledger, quotes: &QuoteOutcome, date: NaiveDate) -> Valuation {
    if let QuoteOutcome::Unavailable { reason } = quotes {
        warn!(%reason, "price source unavailable, valuing all holdings at cost");
    }

    let holdings: Vec<HoldingValuation> = ledger
        .positions
        .values()
        .map(|position| {
            let resolved = resolve_price(&position.symbol, position.avg_price, quotes);
            let market_value = position.market_value(resolved.price);
            let book_cost = position.book_cost();
            let unrealized_pl = market_value - book_cost;
            HoldingValuation {
                symbol: position.symbol.clone(),
                shares: position.shares,
                avg_price: position.avg_price,
                book_cost,
                current_price: resolved.price,
                price_source: resolved.source,
                market_value,
                unrealized_pl,
                outcome: Outcome::classify(unrealized_pl),
            }
        })
        .collect();

    let market_value: f64 = holdings.iter().map(|h| h.market_value).sum();
    let total_unrealized_pl: f64 = holdings.iter().map(|h| h.unrealized_pl).sum();
    let count = |outcome: Outcome| holdings.iter().filter(|h| h.outcome == outcome).count();

    let snapshot = PerformanceSnapshot {
        date,
        cash: ledger.cash,
        portfolio_value: market_value,
        total_equity: ledger.cash + market_value,
        total_unrealized_pl,
        winning_positions: count(Outcome::Winner),
        losing_positions: count(Outcome::Loser),
    };

    Valuation {
        snapshot,
        book_cost: holdings.iter().map(|h| h.book_cost).sum(),
        total_shares: ledger.total_shares(),
        flat_positions: count(Outcome::Flat),
        quotes_unavailable: matches!(quotes, QuoteOutcome::Unavailable { .. }),
        holdings,
    }
}
