//! Configuration validation.
//!
//! Checks every config field before a run touches the ledger.

use crate::domain::config::DEFAULT_START_CAPITAL;
use crate::domain::error::PapertraderError;
use crate::domain::universe::{DEFAULT_UNIVERSE_SIZE, parse_symbols};
use crate::ports::config_port::ConfigPort;

/// Longest accepted lookback window, in days.
pub const MAX_LOOKBACK_DAYS: i64 = 36_500;

pub fn validate_trader_config(config: &dyn ConfigPort) -> Result<(), PapertraderError> {
    validate_start_capital(config)?;
    validate_trade_amounts(config)?;
    validate_thresholds(config)?;
    validate_lookback(config)?;
    validate_universe(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> PapertraderError {
    PapertraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_start_capital(config: &dyn ConfigPort) -> Result<(), PapertraderError> {
    let value = config.get_double("ledger", "start_capital", DEFAULT_START_CAPITAL);
    if !(value > 0.0) {
        return Err(invalid("ledger", "start_capital", "start_capital must be positive"));
    }
    Ok(())
}

fn validate_trade_amounts(config: &dyn ConfigPort) -> Result<(), PapertraderError> {
    let buy = config.get_double("strategy", "buy_amount", 5.0);
    if !(buy > 0.0) {
        return Err(invalid("strategy", "buy_amount", "buy_amount must be positive"));
    }
    let sell = config.get_double("strategy", "sell_amount", 10.0);
    if !(sell > 0.0) {
        return Err(invalid("strategy", "sell_amount", "sell_amount must be positive"));
    }
    Ok(())
}

fn validate_thresholds(config: &dyn ConfigPort) -> Result<(), PapertraderError> {
    let drop = config.get_double("strategy", "drop_pct", -5.0);
    if !(drop < 0.0) {
        return Err(invalid("strategy", "drop_pct", "drop_pct must be negative"));
    }
    let gain = config.get_double("strategy", "gain_pct", 10.0);
    if !(gain > 0.0) {
        return Err(invalid("strategy", "gain_pct", "gain_pct must be positive"));
    }
    Ok(())
}

fn validate_lookback(config: &dyn ConfigPort) -> Result<(), PapertraderError> {
    let days = config.get_int("strategy", "lookback_days", 7);
    if days < 1 {
        return Err(invalid("strategy", "lookback_days", "lookback_days must be at least 1"));
    }
    if days > MAX_LOOKBACK_DAYS {
        return Err(invalid(
            "strategy",
            "lookback_days",
            &format!("lookback_days must be at most {MAX_LOOKBACK_DAYS}"),
        ));
    }
    Ok(())
}

fn validate_universe(config: &dyn ConfigPort) -> Result<(), PapertraderError> {
    let size = config.get_int("universe", "universe_size", DEFAULT_UNIVERSE_SIZE as i64);
    if size < 1 {
        return Err(invalid("universe", "universe_size", "universe_size must be at least 1"));
    }

    let symbols = config
        .get_string("universe", "symbols")
        .filter(|s| !s.trim().is_empty());
    let symbols_file = config
        .get_string("universe", "symbols_file")
        .filter(|s| !s.trim().is_empty());

    match (symbols, symbols_file) {
        (Some(list), _) => parse_symbols(&list)
            .map(|_| ())
            .map_err(|e| invalid("universe", "symbols", &e.to_string())),
        (None, Some(_)) => Ok(()),
        (None, None) => Err(PapertraderError::ConfigMissing {
            section: "universe".to_string(),
            key: "symbols".to_string(),
        }),
    }
}
