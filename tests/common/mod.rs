#![allow(dead_code)]

use chrono::NaiveDate;
use papertrader::domain::config::{StoragePaths, TraderConfig, UniverseSource};
use papertrader::domain::error::PapertraderError;
use papertrader::domain::ledger::Ledger;
pub use papertrader::domain::price_change::PricePoint;
use papertrader::domain::snapshot::PerformanceSnapshot;
use papertrader::domain::strategy::StrategyConfig;
use papertrader::domain::trade::TradeRecord;
use papertrader::domain::weekly::WeeklySummaryRow;
use papertrader::ports::ledger_port::LedgerStore;
use papertrader::ports::price_feed_port::PriceFeed;
use papertrader::ports::snapshot_port::SnapshotStore;
use papertrader::ports::trade_log_port::TradeLog;
use papertrader::ports::universe_port::UniverseProvider;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

pub struct MockUniverse {
    pub symbols: Vec<String>,
    pub error: Option<String>,
}

impl MockUniverse {
    pub fn new(symbols: &[&str]) -> Self {
        Self {
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
            error: None,
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            symbols: Vec::new(),
            error: Some(reason.to_string()),
        }
    }
}

impl UniverseProvider for MockUniverse {
    fn get_symbols(&self) -> Result<Vec<String>, PapertraderError> {
        match &self.error {
            Some(reason) => Err(PapertraderError::Fetch {
                reason: reason.clone(),
            }),
            None => Ok(self.symbols.clone()),
        }
    }
}

pub struct MockPriceFeed {
    pub history: HashMap<String, Vec<PricePoint>>,
    pub latest: HashMap<String, f64>,
    pub unavailable: Option<String>,
}

impl MockPriceFeed {
    pub fn new() -> Self {
        Self {
            history: HashMap::new(),
            latest: HashMap::new(),
            unavailable: None,
        }
    }

    pub fn with_history(mut self, symbol: &str, points: &[(NaiveDate, f64)]) -> Self {
        self.history.insert(
            symbol.to_string(),
            points.iter().map(|(d, p)| PricePoint::new(*d, *p)).collect(),
        );
        self
    }

    pub fn with_latest(mut self, symbol: &str, price: f64) -> Self {
        self.latest.insert(symbol.to_string(), price);
        self
    }

    pub fn unavailable(mut self, reason: &str) -> Self {
        self.unavailable = Some(reason.to_string());
        self
    }

    fn check(&self) -> Result<(), PapertraderError> {
        match &self.unavailable {
            Some(reason) => Err(PapertraderError::Fetch {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl PriceFeed for MockPriceFeed {
    fn get_history(
        &self,
        symbols: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HashMap<String, Vec<PricePoint>>, PapertraderError> {
        self.check()?;
        let mut out = HashMap::new();
        for symbol in symbols {
            if let Some(points) = self.history.get(symbol) {
                let window: Vec<PricePoint> = points
                    .iter()
                    .filter(|p| p.date >= start && p.date <= end)
                    .copied()
                    .collect();
                if !window.is_empty() {
                    out.insert(symbol.clone(), window);
                }
            }
        }
        Ok(out)
    }

    fn get_latest(&self, symbols: &[String]) -> Result<HashMap<String, f64>, PapertraderError> {
        self.check()?;
        Ok(symbols
            .iter()
            .filter_map(|s| self.latest.get(s).map(|p| (s.clone(), *p)))
            .collect())
    }
}

pub struct MemoryLedgerStore {
    pub start_capital: f64,
    pub stored: RefCell<Option<Ledger>>,
    pub saves: Cell<usize>,
    pub fail_saves: bool,
}

impl MemoryLedgerStore {
    pub fn new(start_capital: f64) -> Self {
        Self {
            start_capital,
            stored: RefCell::new(None),
            saves: Cell::new(0),
            fail_saves: false,
        }
    }

    pub fn with_ledger(self, ledger: Ledger) -> Self {
        *self.stored.borrow_mut() = Some(ledger);
        self
    }

    pub fn failing_saves(mut self) -> Self {
        self.fail_saves = true;
        self
    }

    pub fn current(&self) -> Ledger {
        self.load().unwrap()
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn load(&self) -> Result<Ledger, PapertraderError> {
        Ok(self
            .stored
            .borrow()
            .clone()
            .unwrap_or_else(|| Ledger::new(self.start_capital)))
    }

    fn save(&self, ledger: &Ledger) -> Result<(), PapertraderError> {
        if self.fail_saves {
            return Err(PapertraderError::Storage {
                path: "memory".into(),
                reason: "read-only".into(),
            });
        }
        *self.stored.borrow_mut() = Some(ledger.clone());
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryTradeLog {
    pub trades: RefCell<Vec<TradeRecord>>,
    pub fail_appends: bool,
}

impl MemoryTradeLog {
    pub fn failing() -> Self {
        Self {
            fail_appends: true,
            ..Self::default()
        }
    }
}

impl TradeLog for MemoryTradeLog {
    fn append(&self, trades: &[TradeRecord]) -> Result<(), PapertraderError> {
        if self.fail_appends {
            return Err(PapertraderError::Storage {
                path: "memory".into(),
                reason: "disk full".into(),
            });
        }
        self.trades.borrow_mut().extend_from_slice(trades);
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<TradeRecord>, PapertraderError> {
        Ok(self.trades.borrow().clone())
    }
}

#[derive(Default)]
pub struct MemorySnapshotStore {
    pub snapshots: RefCell<BTreeMap<NaiveDate, PerformanceSnapshot>>,
    pub weekly: RefCell<Option<Vec<WeeklySummaryRow>>>,
}

impl MemorySnapshotStore {
    pub fn with_snapshots(snapshots: Vec<PerformanceSnapshot>) -> Self {
        let store = Self::default();
        for s in snapshots {
            store.snapshots.borrow_mut().insert(s.date, s);
        }
        store
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn write_snapshot(&self, snapshot: &PerformanceSnapshot) -> Result<(), PapertraderError> {
        self.snapshots
            .borrow_mut()
            .insert(snapshot.date, snapshot.clone());
        Ok(())
    }

    fn read_snapshots(&self) -> Result<Vec<PerformanceSnapshot>, PapertraderError> {
        Ok(self.snapshots.borrow().values().cloned().collect())
    }

    fn write_weekly_summary(&self, rows: &[WeeklySummaryRow]) -> Result<(), PapertraderError> {
        *self.weekly.borrow_mut() = Some(rows.to_vec());
        Ok(())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Default strategy settings over an inline symbol list. Paths are unused by
/// the in-memory stores.
pub fn sample_config(symbols: &[&str]) -> TraderConfig {
    TraderConfig {
        start_capital: 5000.0,
        universe_size: 500,
        universe: UniverseSource::Symbols(symbols.iter().map(|s| s.to_string()).collect()),
        price_dir: PathBuf::from("prices"),
        strategy: StrategyConfig::default(),
        storage: StoragePaths {
            portfolio_file: PathBuf::from("portfolio.csv"),
            trades_file: PathBuf::from("trades_history.csv"),
            performance_dir: PathBuf::from("performance"),
            weekly_summary_file: PathBuf::from("weekly_summary.csv"),
        },
    }
}

pub fn snapshot(d: NaiveDate, equity: f64) -> PerformanceSnapshot {
    PerformanceSnapshot {
        date: d,
        cash: equity,
        portfolio_value: 0.0,
        total_equity: equity,
        total_unrealized_pl: 0.0,
        winning_positions: 0,
        losing_positions: 0,
    }
}
