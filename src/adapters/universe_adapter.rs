//! Universe providers: a constituents CSV file, or a list from the config.

use std::path::PathBuf;

use tracing::debug;

use crate::domain::error::PapertraderError;
use crate::domain::universe::select_universe;
use crate::ports::universe_port::UniverseProvider;

/// Reads the `Symbol` column of a constituents table. Other columns are
/// ignored.
pub struct FileUniverseAdapter {
    path: PathBuf,
    size: usize,
}

impl FileUniverseAdapter {
    pub fn new(path: PathBuf, size: usize) -> Self {
        Self { path, size }
    }
}

impl UniverseProvider for FileUniverseAdapter {
    fn get_symbols(&self) -> Result<Vec<String>, PapertraderError> {
        let fetch_err = |reason: String| PapertraderError::Fetch {
            reason: format!("universe {}: {}", self.path.display(), reason),
        };

        let mut rdr = csv::Reader::from_path(&self.path).map_err(|e| fetch_err(e.to_string()))?;
        let headers = rdr.headers().map_err(|e| fetch_err(e.to_string()))?.clone();
        let idx = headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case("symbol"))
            .ok_or_else(|| fetch_err("missing Symbol column".into()))?;

        let mut raw = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| fetch_err(e.to_string()))?;
            if let Some(symbol) = record.get(idx) {
                raw.push(symbol.to_string());
            }
        }

        let symbols = select_universe(raw, self.size)?;
        debug!(count = symbols.len(), "universe loaded");
        Ok(symbols)
    }
}

/// A fixed symbol list, as given in the `[universe] symbols` key.
pub struct ListUniverseAdapter {
    symbols: Vec<String>,
    size: usize,
}

impl ListUniverseAdapter {
    pub fn new(symbols: Vec<String>, size: usize) -> Self {
        Self { symbols, size }
    }
}

impl UniverseProvider for ListUniverseAdapter {
    fn get_symbols(&self) -> Result<Vec<String>, PapertraderError> {
        Ok(select_universe(self.symbols.clone(), self.size)?)
    }
}
