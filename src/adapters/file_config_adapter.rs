//! INI file configuration adapter.
//!
//! papertrader reads four sections, all optional apart from a universe source:
//!
//! ```ini
//! [ledger]
//! start_capital = 5000
//! portfolio_file = portfolio.csv
//! trades_file = trades_history.csv
//! performance_dir = performance
//! weekly_summary_file = weekly_summary.csv
//!
//! [strategy]
//! buy_amount = 5
//! sell_amount = 10
//! drop_pct = -5
//! gain_pct = 10
//! lookback_days = 7
//!
//! [universe]
//! ; or: symbols_file = sp500.csv
//! symbols = AAPL, MSFT, BRK.B
//! universe_size = 500
//!
//! [prices]
//! data_dir = prices
//! ```
//!
//! Unparseable numbers read as the caller's default; validation happens in
//! [`crate::domain::config_validation`].

use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

/// Keys are matched case-insensitively, as `configparser` lowercases them.
pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_config() {
        let content = r#"
[ledger]
start_capital = 5000
portfolio_file = data/portfolio.csv

[universe]
symbols = AAPL, MSFT, BRK.B
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("ledger", "portfolio_file"),
            Some("data/portfolio.csv".to_string())
        );
        assert_eq!(
            adapter.get_string("universe", "symbols"),
            Some("AAPL, MSFT, BRK.B".to_string())
        );
    }

    #[test]
    fn keys_are_case_insensitive() {
        let adapter = FileConfigAdapter::from_string("[Strategy]\nLookback_Days = 10\n").unwrap();
        assert_eq!(adapter.get_int("strategy", "lookback_days", 7), 10);
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[ledger]\nstart_capital = 100\n").unwrap();
        assert_eq!(adapter.get_string("ledger", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_int_returns_value() {
        let adapter = FileConfigAdapter::from_string("[strategy]\nlookback_days = 14\n").unwrap();
        assert_eq!(adapter.get_int("strategy", "lookback_days", 7), 14);
    }

    #[test]
    fn get_int_returns_default_for_missing() {
        let adapter = FileConfigAdapter::from_string("[strategy]\n").unwrap();
        assert_eq!(adapter.get_int("strategy", "lookback_days", 7), 7);
    }

    #[test]
    fn get_int_returns_default_for_non_numeric() {
        let adapter = FileConfigAdapter::from_string("[universe]\nuniverse_size = lots\n").unwrap();
        assert_eq!(adapter.get_int("universe", "universe_size", 500), 500);
    }

    #[test]
    fn get_double_reads_negative_values() {
        let adapter = FileConfigAdapter::from_string("[strategy]\ndrop_pct = -7.5\n").unwrap();
        assert_eq!(adapter.get_double("strategy", "drop_pct", -5.0), -7.5);
    }

    #[test]
    fn get_double_returns_default_for_missing() {
        let adapter = FileConfigAdapter::from_string("[strategy]\n").unwrap();
        assert_eq!(adapter.get_double("strategy", "buy_amount", 5.0), 5.0);
    }

    #[test]
    fn get_double_returns_default_for_non_numeric() {
        let adapter =
            FileConfigAdapter::from_string("[ledger]\nstart_capital = not_a_number\n").unwrap();
        assert_eq!(adapter.get_double("ledger", "start_capital", 5000.0), 5000.0);
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[prices]\ndata_dir = /var/prices\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("prices", "data_dir"),
            Some("/var/prices".to_string())
        );
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/config.ini");
        assert!(result.is_err());
    }
}
