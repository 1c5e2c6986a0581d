//! CSV file price feed.
//!
//! One file per symbol, `<data_dir>/<SYMBOL>.csv`, with a `date` column and an
//! `adj_close` column. Files without `adj_close` fall back to `close`.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::domain::error::PapertraderError;
use crate::domain::price_change::{PricePoint, latest_price};
use crate::ports::price_feed_port::PriceFeed;

pub struct CsvPriceAdapter {
    data_dir: PathBuf,
}

impl CsvPriceAdapter {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.data_dir.join(format!("{}.csv", symbol))
    }

    fn ensure_available(&self) -> Result<(), PapertraderError> {
        if self.data_dir.is_dir() {
            Ok(())
        } else {
            Err(PapertraderError::Fetch {
                reason: format!("price directory {} not found", self.data_dir.display()),
            })
        }
    }

    /// Points in `[start, end]`, sorted by date. `None` when the symbol has no
    /// file.
    fn read_history(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Option<Vec<PricePoint>>, PapertraderError> {
        let path = self.csv_path(symbol);
        if !path.exists() {
            debug!(symbol, "no price file");
            return Ok(None);
        }

        let fetch_err = |reason: String| PapertraderError::Fetch {
            reason: format!("{}: {}", path.display(), reason),
        };

        let mut rdr = csv::Reader::from_path(&path).map_err(|e| fetch_err(e.to_string()))?;
        let headers = rdr.headers().map_err(|e| fetch_err(e.to_string()))?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };

        let date_idx = column("date").ok_or_else(|| fetch_err("missing date column".into()))?;
        let price_idx = column("adj_close")
            .or_else(|| column("close"))
            .ok_or_else(|| fetch_err("missing adj_close column".into()))?;

        let mut points = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| fetch_err(format!("CSV parse error: {}", e)))?;

            let date_str = record.get(date_idx).unwrap_or_default().trim();
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
                .map_err(|e| fetch_err(format!("invalid date {:?}: {}", date_str, e)))?;

            if start.is_some_and(|s| date < s) || end.is_some_and(|e| date > e) {
                continue;
            }

            // Blank prices are gaps in the series, not errors.
            let raw = record.get(price_idx).unwrap_or_default().trim();
            if raw.is_empty() {
                continue;
            }
            let price: f64 = raw
                .parse()
                .map_err(|e| fetch_err(format!("invalid price {:?}: {}", raw, e)))?;
            points.push(PricePoint::new(date, price));
        }

        points.sort_by_key(|p| p.date);
        Ok(Some(points))
    }
}

impl PriceFeed for CsvPriceAdapter {
    fn get_history(
        &self,
        symbols: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HashMap<String, Vec<PricePoint>>, PapertraderError> {
        self.ensure_available()?;

        let mut histories = HashMap::new();
        for symbol in symbols {
            match self.read_history(symbol, Some(start), Some(end)) {
                Ok(Some(points)) if !points.is_empty() => {
                    histories.insert(symbol.clone(), points);
                }
                Ok(_) => {}
                Err(e) => warn!(symbol = %symbol, error = %e, "skipping unreadable price file"),
            }
        }

        debug!(requested = symbols.len(), found = histories.len(), "history loaded");
        Ok(histories)
    }

    fn get_latest(&self, symbols: &[String]) -> Result<HashMap<String, f64>, PapertraderError> {
        self.ensure_available()?;

        let mut latest = HashMap::new();
        for symbol in symbols {
            match self.read_history(symbol, None, None) {
                Ok(Some(points)) => {
                    if let Some(price) = latest_price(&points) {
                        latest.insert(symbol.clone(), price);
                    }
                }
                Ok(None) => {}
                Err(e) => warn!(symbol = %symbol, error = %e, "skipping unreadable price file"),
            }
        }
        Ok(latest)
    }
}
