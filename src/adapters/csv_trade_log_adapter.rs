//! Append-only CSV trade log.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use tracing::debug;

use crate::domain::error::PapertraderError;
use crate::domain::trade::TradeRecord;
use crate::ports::trade_log_port::TradeLog;

pub struct CsvTradeLogAdapter {
    path: PathBuf,
}

impl CsvTradeLogAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn has_content(&self) -> bool {
        fs::metadata(&self.path).map(|m| m.len() > 0).unwrap_or(false)
    }
}

impl TradeLog for CsvTradeLogAdapter {
    fn append(&self, trades: &[TradeRecord]) -> Result<(), PapertraderError> {
        if trades.is_empty() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| PapertraderError::storage(parent, e))?;
        }

        // Header only when the file is new.
        let write_header = !self.has_content();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| PapertraderError::storage(&self.path, e))?;

        let mut wtr = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(file);
        for trade in trades {
            wtr.serialize(trade)
                .map_err(|e| PapertraderError::storage(&self.path, e))?;
        }
        wtr.flush()
            .map_err(|e| PapertraderError::storage(&self.path, e))?;

        debug!(path = %self.path.display(), count = trades.len(), "trades appended");
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<TradeRecord>, PapertraderError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut rdr =
            csv::Reader::from_path(&self.path).map_err(|e| PapertraderError::storage(&self.path, e))?;
        rdr.deserialize()
            .map(|row| row.map_err(|e| PapertraderError::storage(&self.path, e)))
            .collect()
    }
}
