//! Concrete adapter implementations for ports.

pub mod atomic_file;
pub mod csv_ledger_adapter;
pub mod csv_price_adapter;
pub mod csv_snapshot_adapter;
pub mod csv_trade_log_adapter;
pub mod file_config_adapter;
pub mod universe_adapter;
