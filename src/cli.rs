//! CLI definition and dispatch.

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_ledger_adapter::CsvLedgerAdapter;
use crate::adapters::csv_price_adapter::CsvPriceAdapter;
use crate::adapters::csv_snapshot_adapter::CsvSnapshotAdapter;
use crate::adapters::csv_trade_log_adapter::CsvTradeLogAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::universe_adapter::{FileUniverseAdapter, ListUniverseAdapter};
use crate::domain::config::{
    DEFAULT_PERFORMANCE_DIR, DEFAULT_PORTFOLIO_FILE, DEFAULT_PRICE_DIR, DEFAULT_START_CAPITAL,
    DEFAULT_TRADES_FILE, DEFAULT_WEEKLY_SUMMARY_FILE, StoragePaths, TraderConfig, UniverseSource,
};
use crate::domain::config_validation::validate_trader_config;
use crate::domain::daily_run::{
    DayReport, RunPorts, audit_ledger, evaluate_portfolio, rebuild_weekly_summary, run_day,
};
use crate::domain::error::PapertraderError;
use crate::domain::strategy::StrategyConfig;
use crate::domain::universe::{DEFAULT_UNIVERSE_SIZE, parse_symbols};
use crate::domain::valuation::{PriceSource, Valuation};
use crate::domain::weekly::WeeklySummary;
use crate::ports::config_port::ConfigPort;
use crate::ports::universe_port::UniverseProvider;

/// Exit code when the audit finds the ledger and trade log disagree.
pub const AUDIT_MISMATCH_EXIT: u8 = 6;

#[derive(Parser, Debug)]
#[command(name = "papertrader", about = "Daily paper-trading ledger and valuation")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the daily strategy pass
    Run {
        #[arg(short, long)]
        config: PathBuf,
        /// Trade date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Evaluate and print, but persist nothing
        #[arg(long)]
        dry_run: bool,
    },
    /// Mark the portfolio to market and write a snapshot
    Evaluate {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Rebuild the weekly summary from all snapshots
    Weekly {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Replay the trade log and compare with the stored ledger
    Audit {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run {
            config,
            date,
            dry_run,
        } => run_daily(&config, date.unwrap_or_else(today), dry_run),
        Command::Evaluate { config, date } => run_evaluate(&config, date.unwrap_or_else(today)),
        Command::Weekly { config } => run_weekly(&config),
        Command::Audit { config } => run_audit(&config),
        Command::Validate { config } => run_validate(&config),
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = PapertraderError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn config_base_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn resolve_path(base_dir: &Path, value: &str) -> PathBuf {
    let path = PathBuf::from(value.trim());
    if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    }
}

fn path_setting(
    adapter: &dyn ConfigPort,
    base_dir: &Path,
    section: &str,
    key: &str,
    default: &str,
) -> PathBuf {
    let value = adapter
        .get_string(section, key)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default.to_string());
    resolve_path(base_dir, &value)
}

/// Build the run configuration. Relative paths resolve against `base_dir`,
/// normally the directory holding the config file.
pub fn build_trader_config(
    adapter: &dyn ConfigPort,
    base_dir: &Path,
) -> Result<TraderConfig, PapertraderError> {
    let universe_size = adapter.get_int("universe", "universe_size", DEFAULT_UNIVERSE_SIZE as i64);
    let universe_size = usize::try_from(universe_size)
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| PapertraderError::ConfigInvalid {
            section: "universe".into(),
            key: "universe_size".into(),
            reason: "universe_size must be at least 1".into(),
        })?;

    let symbols = adapter
        .get_string("universe", "symbols")
        .filter(|s| !s.trim().is_empty());
    let symbols_file = adapter
        .get_string("universe", "symbols_file")
        .filter(|s| !s.trim().is_empty());
    let universe = match (symbols, symbols_file) {
        (Some(list), _) => {
            UniverseSource::Symbols(parse_symbols(&list).map_err(|e| {
                PapertraderError::ConfigInvalid {
                    section: "universe".into(),
                    key: "symbols".into(),
                    reason: e.to_string(),
                }
            })?)
        }
        (None, Some(file)) => UniverseSource::File(resolve_path(base_dir, &file)),
        (None, None) => {
            return Err(PapertraderError::ConfigMissing {
                section: "universe".into(),
                key: "symbols".into(),
            });
        }
    };

    let defaults = StrategyConfig::default();
    let strategy = StrategyConfig {
        buy_amount: adapter.get_double("strategy", "buy_amount", defaults.buy_amount),
        sell_amount: adapter.get_double("strategy", "sell_amount", defaults.sell_amount),
        drop_pct: adapter.get_double("strategy", "drop_pct", defaults.drop_pct),
        gain_pct: adapter.get_double("strategy", "gain_pct", defaults.gain_pct),
        lookback_days: adapter.get_int("strategy", "lookback_days", defaults.lookback_days),
    };

    Ok(TraderConfig {
        start_capital: adapter.get_double("ledger", "start_capital", DEFAULT_START_CAPITAL),
        universe_size,
        universe,
        price_dir: path_setting(adapter, base_dir, "prices", "data_dir", DEFAULT_PRICE_DIR),
        strategy,
        storage: StoragePaths {
            portfolio_file: path_setting(
                adapter,
                base_dir,
                "ledger",
                "portfolio_file",
                DEFAULT_PORTFOLIO_FILE,
            ),
            trades_file: path_setting(adapter, base_dir, "ledger", "trades_file", DEFAULT_TRADES_FILE),
            performance_dir: path_setting(
                adapter,
                base_dir,
                "ledger",
                "performance_dir",
                DEFAULT_PERFORMANCE_DIR,
            ),
            weekly_summary_file: path_setting(
                adapter,
                base_dir,
                "ledger",
                "weekly_summary_file",
                DEFAULT_WEEKLY_SUMMARY_FILE,
            ),
        },
    })
}

/// Load, validate and build the configuration at `config_path`.
pub fn prepare_config(config_path: &Path) -> Result<TraderConfig, ExitCode> {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = load_config(config_path)?;

    let built = validate_trader_config(&adapter)
        .and_then(|()| build_trader_config(&adapter, &config_base_dir(config_path)));
    built.map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

fn universe_provider(config: &TraderConfig) -> Box<dyn UniverseProvider> {
    match &config.universe {
        UniverseSource::Symbols(symbols) => {
            Box::new(ListUniverseAdapter::new(symbols.clone(), config.universe_size))
        }
        UniverseSource::File(path) => {
            Box::new(FileUniverseAdapter::new(path.clone(), config.universe_size))
        }
    }
}

fn ledger_store(config: &TraderConfig) -> CsvLedgerAdapter {
    CsvLedgerAdapter::new(config.storage.portfolio_file.clone(), config.start_capital)
}

fn snapshot_store(config: &TraderConfig) -> CsvSnapshotAdapter {
    CsvSnapshotAdapter::new(
        config.storage.performance_dir.clone(),
        config.storage.weekly_summary_file.clone(),
    )
}

pub fn run_daily(config_path: &Path, date: NaiveDate, dry_run: bool) -> ExitCode {
    let config = match prepare_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let universe = universe_provider(&config);
    let feed = CsvPriceAdapter::new(config.price_dir.clone());
    let ledger = ledger_store(&config);
    let trades = CsvTradeLogAdapter::new(config.storage.trades_file.clone());
    let snapshots = snapshot_store(&config);
    let ports = RunPorts {
        universe: universe.as_ref(),
        feed: &feed,
        ledger: &ledger,
        trades: &trades,
        snapshots: &snapshots,
    };

    eprintln!(
        "Running strategy for {}{}",
        date,
        if dry_run { " (dry run)" } else { "" }
    );
    match run_day(&ports, &config, date, dry_run) {
        Ok(report) => {
            print_day_report(&report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            match &e {
                PapertraderError::PartialWrite { written, .. } => {
                    eprintln!("Saved before the failure: {}.", written.join(", "));
                    eprintln!("Run `papertrader audit` to compare the ledger with the trade log.");
                }
                _ => eprintln!("No changes were saved."),
            }
            (&e).into()
        }
    }
}

fn print_day_report(report: &DayReport) {
    let evaluation = &report.evaluation;

    eprintln!(
        "  Universe: {} symbols, {} with usable prices",
        report.universe_size, report.symbols_with_data
    );
    if !evaluation.no_data.is_empty() {
        eprintln!(
            "  No data ({}): {}",
            evaluation.no_data.len(),
            evaluation.no_data.join(", ")
        );
    }

    eprintln!("\n=== Trades ({}) ===", report.date);
    if evaluation.trades.is_empty() {
        eprintln!("  none");
    }
    for trade in &evaluation.trades {
        println!("{}", trade);
    }

    let snapshot = &report.valuation.snapshot;
    eprintln!("\n=== Summary ===");
    eprintln!("Buys:             {}", evaluation.buys());
    eprintln!("Sells:            {}", evaluation.sells());
    eprintln!("Held:             {}", evaluation.holds.len());
    eprintln!("Realized P/L:     {}", signed_dollars(evaluation.realized_pl));
    eprintln!("Cash:             ${:.2}", report.ledger.cash);
    eprintln!("Positions:        {}", report.ledger.position_count());
    eprintln!("Total Equity:     ${:.2}", snapshot.total_equity);

    if !report.persisted {
        eprintln!("\nDry run: nothing was saved.");
    }
}

pub fn run_evaluate(config_path: &Path, date: NaiveDate) -> ExitCode {
    let config = match prepare_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let feed = CsvPriceAdapter::new(config.price_dir.clone());
    match evaluate_portfolio(&ledger_store(&config), &feed, &snapshot_store(&config), date) {
        Ok(valuation) => {
            print_valuation(&valuation);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn signed_dollars(value: f64) -> String {
    let sign = if value >= 0.0 { "+" } else { "-" };
    format!("{}${:.2}", sign, value.abs())
}

fn print_valuation(valuation: &Valuation) {
    let snapshot = &valuation.snapshot;

    println!("=== Portfolio Performance ({}) ===", snapshot.date);
    println!("Cash:             ${:.2}", snapshot.cash);
    println!("Invested:         ${:.2}", valuation.book_cost);
    println!("Market Value:     ${:.2}", snapshot.portfolio_value);
    println!("Total Value:      ${:.2}", snapshot.total_equity);
    println!(
        "Unrealized P/L:   {} ({:+.2}%)",
        signed_dollars(snapshot.total_unrealized_pl),
        valuation.unrealized_pl_pct()
    );
    println!("Positions:        {}", valuation.holdings.len());

    if !valuation.holdings.is_empty() {
        println!("\n=== Holdings ===");
        for h in &valuation.holdings {
            let marker = match h.price_source {
                PriceSource::Fallback => " [cost]",
                PriceSource::Live => "",
            };
            println!(
                "  {:<6} {:>10.4} @ ${:>9.2} -> ${:>9.2}  {}{}",
                h.symbol,
                h.shares,
                h.avg_price,
                h.current_price,
                signed_dollars(h.unrealized_pl),
                marker
            );
        }
        println!(
            "\nWinners: {}  Losers: {}  Flat: {}",
            snapshot.winning_positions, snapshot.losing_positions, valuation.flat_positions
        );
    }

    if valuation.quotes_unavailable {
        eprintln!("warning: price feed unavailable, all holdings valued at cost");
    } else {
        let fallback = valuation.fallback_symbols();
        if !fallback.is_empty() {
            eprintln!("warning: no live price for {}", fallback.join(", "));
        }
    }
}

pub fn run_weekly(config_path: &Path) -> ExitCode {
    let config = match prepare_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    match rebuild_weekly_summary(&snapshot_store(&config)) {
        Ok(summary) => {
            print_weekly(&summary, &config.storage.weekly_summary_file);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn print_weekly(summary: &WeeklySummary, path: &Path) {
    for row in &summary.rows {
        let pl = row
            .weekly_pl
            .map(signed_dollars)
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "{}-W{:02}  {} to {}  {}",
            row.year, row.week_number, row.start_date, row.end_date, pl
        );
    }
    if !summary.duplicate_dates.is_empty() {
        eprintln!(
            "warning: {} duplicate snapshot date(s), kept the latest",
            summary.duplicate_dates.len()
        );
    }
    eprintln!(
        "\n{} weeks, {} wins, {} losses",
        summary.rows.len(),
        summary.wins(),
        summary.losses()
    );
    eprintln!("Weekly summary written to: {}", path.display());
}

pub fn run_audit(config_path: &Path) -> ExitCode {
    let config = match prepare_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let trades = CsvTradeLogAdapter::new(config.storage.trades_file.clone());
    let report = match audit_ledger(&ledger_store(&config), &trades, config.start_capital) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("Replayed {} trades", report.replay.trades_applied);
    eprintln!("Realized P/L:     {}", signed_dollars(report.replay.realized_pl));
    eprintln!("Replayed cash:    ${:.2}", report.replay.ledger.cash);

    if report.is_clean() {
        eprintln!("\nLedger matches the trade log.");
        ExitCode::SUCCESS
    } else {
        eprintln!("\n{} discrepancies:", report.discrepancies.len());
        for d in &report.discrepancies {
            println!("  {:?}", d);
        }
        ExitCode::from(AUDIT_MISMATCH_EXIT)
    }
}

pub fn run_validate(config_path: &Path) -> ExitCode {
    let config = match prepare_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    eprintln!("\nLedger:");
    eprintln!("  start_capital: {:.2}", config.start_capital);
    eprintln!("  portfolio:     {}", config.storage.portfolio_file.display());
    eprintln!("  trades:        {}", config.storage.trades_file.display());
    eprintln!("  performance:   {}", config.storage.performance_dir.display());

    let s = &config.strategy;
    eprintln!("\nStrategy:");
    eprintln!("  buy ${:.2} when change <= {}%", s.buy_amount, s.drop_pct);
    eprintln!("  sell ${:.2} when change >= {}%", s.sell_amount, s.gain_pct);
    eprintln!("  lookback: {} days", s.lookback_days);

    eprintln!("\nUniverse:");
    match &config.universe {
        UniverseSource::Symbols(symbols) => eprintln!("  symbols: {}", symbols.join(", ")),
        UniverseSource::File(path) => eprintln!("  file: {}", path.display()),
    }
    eprintln!("  size: {}", config.universe_size);
    eprintln!("  prices: {}", config.price_dir.display());

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}
