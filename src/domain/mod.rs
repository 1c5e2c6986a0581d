//! Core domain types and logic.

pub mod accounting;
pub mod config;
pub mod config_validation;
pub mod daily_run;
pub mod error;
pub mod ledger;
pub mod position;
pub mod price_change;
pub mod replay;
pub mod snapshot;
pub mod strategy;
pub mod trade;
pub mod universe;
pub mod valuation;
pub mod weekly;
