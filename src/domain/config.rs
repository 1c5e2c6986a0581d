//! Run configuration, built once from the INI file and passed by reference.

use std::path::PathBuf;

use super::strategy::StrategyConfig;

pub const DEFAULT_START_CAPITAL: f64 = 5000.0;
pub const DEFAULT_PORTFOLIO_FILE: &str = "portfolio.csv";
pub const DEFAULT_TRADES_FILE: &str = "trades_history.csv";
pub const DEFAULT_PERFORMANCE_DIR: &str = "performance";
pub const DEFAULT_WEEKLY_SUMMARY_FILE: &str = "weekly_summary.csv";
pub const DEFAULT_PRICE_DIR: &str = "prices";

#[derive(Debug, Clone, PartialEq)]
pub struct StoragePaths {
    pub portfolio_file: PathBuf,
    pub trades_file: PathBuf,
    pub performance_dir: PathBuf,
    pub weekly_summary_file: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UniverseSource {
    /// Symbols listed inline in the config, already normalized.
    Symbols(Vec<String>),
    /// A constituents table with a `Symbol` column.
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraderConfig {
    pub start_capital: f64,
    pub universe_size: usize,
    pub universe: UniverseSource,
    pub price_dir: PathBuf,
    pub strategy: StrategyConfig,
    pub storage: StoragePaths,
}
