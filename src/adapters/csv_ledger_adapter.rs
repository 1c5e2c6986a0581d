//! CSV-backed ledger store.
//!
//! Layout:
//!
//! ```text
//! #cash=4985.5
//! symbol,shares,avg_price,value,last_buy_date,last_sell_date
//! AAPL,0.0265,188.6,5.0,2024-03-04,
//! ```
//!
//! Files written before the cash line existed are still readable; their cash
//! is derived from the start capital.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use tracing::{debug, warn};

use super::atomic_file::{csv_bytes, write_atomic};
use crate::domain::error::PapertraderError;
use crate::domain::ledger::Ledger;
use crate::domain::position::Position;
use crate::ports::ledger_port::LedgerStore;

const CASH_PREFIX: &str = "#cash=";
const HEADER: [&str; 6] = [
    "symbol",
    "shares",
    "avg_price",
    "value",
    "last_buy_date",
    "last_sell_date",
];

pub struct CsvLedgerAdapter {
    path: PathBuf,
    start_capital: f64,
}

impl CsvLedgerAdapter {
    pub fn new(path: PathBuf, start_capital: f64) -> Self {
        Self {
            path,
            start_capital,
        }
    }

    fn parse_positions(&self, body: &str) -> Result<Vec<Position>, PapertraderError> {
        let mut rdr = csv::Reader::from_reader(body.as_bytes());
        let mut positions = Vec::new();
        for row in rdr.deserialize::<Position>() {
            let position = row.map_err(|e| PapertraderError::storage(&self.path, e))?;
            if !(position.shares > 0.0 && position.avg_price > 0.0) {
                return Err(PapertraderError::storage(
                    &self.path,
                    format!("invalid position row for {}", position.symbol),
                ));
            }
            positions.push(position);
        }
        Ok(positions)
    }
}

impl LedgerStore for CsvLedgerAdapter {
    fn load(&self) -> Result<Ledger, PapertraderError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no ledger file, starting with cash only");
            return Ok(Ledger::new(self.start_capital));
        }

        let content =
            fs::read_to_string(&self.path).map_err(|e| PapertraderError::storage(&self.path, e))?;

        let (cash, body) = match content.split_once('\n') {
            Some((first, rest)) if first.trim_start().starts_with(CASH_PREFIX) => {
                let raw = first.trim().trim_start_matches(CASH_PREFIX);
                let cash: f64 = raw.parse().map_err(|e| {
                    PapertraderError::storage(&self.path, format!("invalid cash line: {}", e))
                })?;
                (Some(cash), rest)
            }
            _ => (None, content.as_str()),
        };

        let positions = self.parse_positions(body)?;
        let mut seen = BTreeMap::new();
        for position in positions {
            let symbol = position.symbol.clone();
            if seen.insert(symbol.clone(), position).is_some() {
                return Err(PapertraderError::storage(
                    &self.path,
                    format!("duplicate position for {}", symbol),
                ));
            }
        }

        let ledger = match cash {
            Some(cash) => Ledger {
                cash,
                positions: seen,
            },
            None => {
                let ledger = Ledger::with_derived_cash(self.start_capital, seen.into_values().collect());
                warn!(
                    path = %self.path.display(),
                    cash = ledger.cash,
                    "ledger has no cash line, derived cash from start capital"
                );
                ledger
            }
        };
        Ok(ledger)
    }

    fn save(&self, ledger: &Ledger) -> Result<(), PapertraderError> {
        // One writer for the whole file so cash and rows share a number format.
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_writer(CASH_PREFIX.as_bytes().to_vec());
        wtr.serialize(ledger.cash)
            .map_err(|e| PapertraderError::storage(&self.path, e))?;
        wtr.write_record(HEADER)
            .map_err(|e| PapertraderError::storage(&self.path, e))?;
        for position in ledger.positions.values() {
            wtr.serialize(position)
                .map_err(|e| PapertraderError::storage(&self.path, e))?;
        }

        write_atomic(&self.path, &csv_bytes(wtr, &self.path)?)?;
        debug!(
            path = %self.path.display(),
            positions = ledger.position_count(),
            "ledger saved"
        );
        Ok(())
    }
}
