//! Port traits: the seams between domain logic and storage or data sources.

pub mod config_port;
pub mod ledger_port;
pub mod price_feed_port;
pub mod snapshot_port;
pub mod trade_log_port;
pub mod universe_port;
