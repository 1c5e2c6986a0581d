//! End-to-end passes: the daily trading run, on-demand valuation, the weekly
//! rebuild and the trade-log audit.
//!
//! Every pass works on values loaded from the stores and writes back only
//! after all domain steps have succeeded.

use chrono::{Duration, NaiveDate};
use tracing::{info, warn};

use super::config::TraderConfig;
use super::error::PapertraderError;
use super::ledger::Ledger;
use super::price_change::build_signals;
use super::replay::{Discrepancy, Replay, audit, replay};
use super::strategy::{Evaluation, evaluate};
use super::valuation::{QuoteOutcome, Valuation, value_ledger};
use super::weekly::{WeeklySummary, aggregate_weekly};
use crate::ports::ledger_port::LedgerStore;
use crate::ports::price_feed_port::PriceFeed;
use crate::ports::snapshot_port::SnapshotStore;
use crate::ports::trade_log_port::TradeLog;
use crate::ports::universe_port::UniverseProvider;

/// The collaborators a daily run talks to.
pub struct RunPorts<'a> {
    pub universe: &'a dyn UniverseProvider,
    pub feed: &'a dyn PriceFeed,
    pub ledger: &'a dyn LedgerStore,
    pub trades: &'a dyn TradeLog,
    pub snapshots: &'a dyn SnapshotStore,
}

#[derive(Debug, Clone)]
pub struct DayReport {
    pub date: NaiveDate,
    pub universe_size: usize,
    pub symbols_with_data: usize,
    pub evaluation: Evaluation,
    /// Ledger after the day's trades.
    pub ledger: Ledger,
    /// Holdings valued at the last price in each fetched history.
    pub valuation: Valuation,
    /// False for dry runs.
    pub persisted: bool,
}

/// One trading day: fetch, evaluate, then save the ledger, append the trades
/// and write the day's snapshot.
///
/// An empty history is fatal and leaves every store untouched.
pub fn run_day(
    ports: &RunPorts<'_>,
    config: &TraderConfig,
    today: NaiveDate,
    dry_run: bool,
) -> Result<DayReport, PapertraderError> {
    let universe = ports.universe.get_symbols()?;
    info!(symbols = universe.len(), %today, "universe loaded");

    let start = Duration::try_days(config.strategy.lookback_days)
        .and_then(|lookback| today.checked_sub_signed(lookback))
        .ok_or_else(|| PapertraderError::ConfigInvalid {
            section: "strategy".into(),
            key: "lookback_days".into(),
            reason: format!(
                "{} days before {} is out of range",
                config.strategy.lookback_days, today
            ),
        })?;
    let histories = ports.feed.get_history(&universe, start, today)?;
    if histories.is_empty() {
        return Err(PapertraderError::Fetch {
            reason: format!(
                "no price history for any of {} symbols between {} and {}",
                universe.len(),
                start,
                today
            ),
        });
    }
    let signals = build_signals(&histories);
    info!(
        fetched = histories.len(),
        usable = signals.len(),
        "price history loaded"
    );

    let mut ledger = ports.ledger.load()?;
    let evaluation = evaluate(&mut ledger, &universe, &signals, &config.strategy, today)?;
    info!(
        buys = evaluation.buys(),
        sells = evaluation.sells(),
        no_data = evaluation.no_data.len(),
        cash = ledger.cash,
        "evaluation complete"
    );

    let quotes = QuoteOutcome::Available(signals.latest_prices().clone());
    let valuation = value_ledger(&ledger, &quotes, today);

    if !dry_run {
        persist(ports, &ledger, &evaluation, &valuation)?;
    }

    Ok(DayReport {
        date: today,
        universe_size: universe.len(),
        symbols_with_data: signals.len(),
        evaluation,
        ledger,
        valuation,
        persisted: !dry_run,
    })
}

/// Ledger first: a failed ledger save leaves every store untouched. Later
/// failures come back as [`PapertraderError::PartialWrite`] naming what was
/// already written.
fn persist(
    ports: &RunPorts<'_>,
    ledger: &Ledger,
    evaluation: &Evaluation,
    valuation: &Valuation,
) -> Result<(), PapertraderError> {
    ports.ledger.save(ledger)?;
    let mut written = vec!["ledger".to_string()];

    ports
        .trades
        .append(&evaluation.trades)
        .map_err(|e| partial_write(&written, "trade log", e))?;
    written.push("trade log".to_string());

    ports
        .snapshots
        .write_snapshot(&valuation.snapshot)
        .map_err(|e| partial_write(&written, "snapshot", e))?;
    Ok(())
}

fn partial_write(written: &[String], failed: &str, source: PapertraderError) -> PapertraderError {
    warn!(already_saved = ?written, failed, error = %source, "daily run partially saved");
    PapertraderError::PartialWrite {
        written: written.to_vec(),
        failed: failed.to_string(),
        source: Box::new(source),
    }
}

/// Mark the stored ledger to market and write the day's snapshot.
///
/// A feed failure is not fatal; holdings are valued at cost instead.
pub fn evaluate_portfolio(
    ledger_store: &dyn LedgerStore,
    feed: &dyn PriceFeed,
    snapshots: &dyn SnapshotStore,
    today: NaiveDate,
) -> Result<Valuation, PapertraderError> {
    let ledger = ledger_store.load()?;
    let symbols: Vec<String> = ledger.positions.keys().cloned().collect();

    let quotes = if symbols.is_empty() {
        QuoteOutcome::Available(Default::default())
    } else {
        QuoteOutcome::from_fetch(feed.get_latest(&symbols))
    };
    if let QuoteOutcome::Unavailable { reason } = &quotes {
        warn!(%reason, "quotes unavailable, valuing holdings at cost");
    }

    let valuation = value_ledger(&ledger, &quotes, today);
    snapshots.write_snapshot(&valuation.snapshot)?;
    Ok(valuation)
}

/// Rebuild the weekly summary from every stored snapshot.
pub fn rebuild_weekly_summary(
    snapshots: &dyn SnapshotStore,
) -> Result<WeeklySummary, PapertraderError> {
    let all = snapshots.read_snapshots()?;
    let count = all.len();
    let summary = aggregate_weekly(all);
    snapshots.write_weekly_summary(&summary.rows)?;
    info!(snapshots = count, weeks = summary.rows.len(), "weekly summary rebuilt");
    Ok(summary)
}

#[derive(Debug, Clone)]
pub struct AuditReport {
    pub replay: Replay,
    pub discrepancies: Vec<Discrepancy>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.discrepancies.is_empty()
    }
}

/// Replay the trade log and compare the result with the stored ledger.
pub fn audit_ledger(
    ledger_store: &dyn LedgerStore,
    trade_log: &dyn TradeLog,
    start_capital: f64,
) -> Result<AuditReport, PapertraderError> {
    let stored = ledger_store.load()?;
    let trades = trade_log.read_all()?;
    let replayed = replay(start_capital, &trades)?;
    let discrepancies = audit(&stored, &trades, &replayed);
    for d in &discrepancies {
        warn!(discrepancy = ?d, "ledger disagrees with trade log");
    }
    Ok(AuditReport {
        replay: replayed,
        discrepancies,
    })
}
