//! Performance snapshots as one CSV per date, plus the weekly summary file.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::atomic_file::{csv_bytes, write_atomic};
use crate::domain::error::PapertraderError;
use crate::domain::snapshot::PerformanceSnapshot;
use crate::domain::weekly::WeeklySummaryRow;
use crate::ports::snapshot_port::SnapshotStore;

const SNAPSHOT_PREFIX: &str = "performance_";
const LEGACY_PREFIX: &str = "performance_weekly_";
const WEEKLY_HEADER: [&str; 6] = [
    "year",
    "week_number",
    "start_date",
    "end_date",
    "weekly_pl",
    "win_loss",
];

/// Snapshot file layouts, in the order they are read for a given date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum SnapshotLayout {
    /// `performance_weekly_<date>.csv`: date, cash, portfolio_value,
    /// total_equity, with holdings at cost.
    Legacy,
    Daily,
}

#[derive(Debug, Deserialize)]
struct LegacySnapshotRow {
    date: NaiveDate,
    cash: f64,
    portfolio_value: f64,
    total_equity: f64,
}

impl From<LegacySnapshotRow> for PerformanceSnapshot {
    fn from(row: LegacySnapshotRow) -> Self {
        PerformanceSnapshot {
            date: row.date,
            cash: row.cash,
            portfolio_value: row.portfolio_value,
            total_equity: row.total_equity,
            total_unrealized_pl: 0.0,
            winning_positions: 0,
            losing_positions: 0,
        }
    }
}

/// Date and layout encoded in a snapshot file name, if it is one.
fn classify(name: &str) -> Option<(NaiveDate, SnapshotLayout)> {
    let stem = name.strip_suffix(".csv")?;
    let (date, layout) = match stem.strip_prefix(LEGACY_PREFIX) {
        Some(date) => (date, SnapshotLayout::Legacy),
        None => (stem.strip_prefix(SNAPSHOT_PREFIX)?, SnapshotLayout::Daily),
    };
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    Some((date, layout))
}

pub struct CsvSnapshotAdapter {
    performance_dir: PathBuf,
    weekly_summary_file: PathBuf,
}

impl CsvSnapshotAdapter {
    pub fn new(performance_dir: PathBuf, weekly_summary_file: PathBuf) -> Self {
        Self {
            performance_dir,
            weekly_summary_file,
        }
    }

    pub fn snapshot_path(&self, date: NaiveDate) -> PathBuf {
        self.performance_dir
            .join(format!("{}{}.csv", SNAPSHOT_PREFIX, date.format("%Y-%m-%d")))
    }

    fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, PapertraderError> {
        let mut rdr = csv::Reader::from_path(path).map_err(|e| PapertraderError::storage(path, e))?;
        rdr.deserialize()
            .map(|row| row.map_err(|e| PapertraderError::storage(path, e)))
            .collect()
    }

    fn read_file(
        path: &Path,
        layout: SnapshotLayout,
    ) -> Result<Vec<PerformanceSnapshot>, PapertraderError> {
        match layout {
            SnapshotLayout::Daily => Self::read_rows(path),
            SnapshotLayout::Legacy => Ok(Self::read_rows::<LegacySnapshotRow>(path)?
                .into_iter()
                .map(PerformanceSnapshot::from)
                .collect()),
        }
    }
}

impl SnapshotStore for CsvSnapshotAdapter {
    fn write_snapshot(&self, snapshot: &PerformanceSnapshot) -> Result<(), PapertraderError> {
        let path = self.snapshot_path(snapshot.date);
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.serialize(snapshot)
            .map_err(|e| PapertraderError::storage(&path, e))?;
        write_atomic(&path, &csv_bytes(wtr, &path)?)?;
        debug!(path = %path.display(), "snapshot written");
        Ok(())
    }

    fn read_snapshots(&self) -> Result<Vec<PerformanceSnapshot>, PapertraderError> {
        if !self.performance_dir.exists() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&self.performance_dir)
            .map_err(|e| PapertraderError::storage(&self.performance_dir, e))?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| PapertraderError::storage(&self.performance_dir, e))?;
            if let Some((date, layout)) = classify(&entry.file_name().to_string_lossy()) {
                files.push((date, layout, entry.path()));
            }
        }
        // A daily file is read after a legacy one for the same date, so it wins.
        files.sort();

        let mut snapshots = Vec::new();
        for (_, layout, path) in files {
            match Self::read_file(&path, layout) {
                Ok(rows) => snapshots.extend(rows),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable snapshot"),
            }
        }
        Ok(snapshots)
    }

    fn write_weekly_summary(&self, rows: &[WeeklySummaryRow]) -> Result<(), PapertraderError> {
        let path = &self.weekly_summary_file;
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        wtr.write_record(WEEKLY_HEADER)
            .map_err(|e| PapertraderError::storage(path, e))?;
        for row in rows {
            wtr.serialize(row)
                .map_err(|e| PapertraderError::storage(path, e))?;
        }
        write_atomic(path, &csv_bytes(wtr, path)?)?;
        debug!(path = %path.display(), weeks = rows.len(), "weekly summary written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::weekly::WinLoss;
    use tempfile::TempDir;

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    fn snapshot(d: NaiveDate, equity: f64) -> PerformanceSnapshot {
        PerformanceSnapshot {
            date: d,
            cash: equity - 10.0,
            portfolio_value: 10.0,
            total_equity: equity,
            total_unrealized_pl: 0.5,
            winning_positions: 1,
            losing_positions: 0,
        }
    }

    fn store(dir: &TempDir) -> CsvSnapshotAdapter {
        CsvSnapshotAdapter::new(
            dir.path().join("performance"),
            dir.path().join("weekly_summary.csv"),
        )
    }

    #[test]
    fn snapshot_file_name() {
        let dir = TempDir::new().unwrap();
        let path = store(&dir).snapshot_path(date(3, 4));
        assert!(path.ends_with("performance/performance_2024-03-04.csv"));
    }

    #[test]
    fn read_without_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(store(&dir).read_snapshots().unwrap().is_empty());
    }

    #[test]
    fn write_then_read_sorted() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.write_snapshot(&snapshot(date(3, 5), 5001.0)).unwrap();
        store.write_snapshot(&snapshot(date(3, 4), 5000.0)).unwrap();

        let read = store.read_snapshots().unwrap();
        assert_eq!(read, vec![snapshot(date(3, 4), 5000.0), snapshot(date(3, 5), 5001.0)]);
    }

    #[test]
    fn same_date_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.write_snapshot(&snapshot(date(3, 4), 5000.0)).unwrap();
        store.write_snapshot(&snapshot(date(3, 4), 4999.0)).unwrap();

        let read = store.read_snapshots().unwrap();
        assert_eq!(read, vec![snapshot(date(3, 4), 4999.0)]);
    }

    #[test]
    fn unrelated_files_are_ignored() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.write_snapshot(&snapshot(date(3, 4), 5000.0)).unwrap();
        fs::write(dir.path().join("performance").join("notes.txt"), "hi").unwrap();

        assert_eq!(store.read_snapshots().unwrap().len(), 1);
    }

    #[test]
    fn names_without_a_date_are_ignored() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.write_snapshot(&snapshot(date(3, 4), 5000.0)).unwrap();
        fs::write(
            dir.path().join("performance").join("performance_backup.csv"),
            "date,cash\n2024-03-05,1\n",
        )
        .unwrap();

        assert_eq!(store.read_snapshots().unwrap(), vec![snapshot(date(3, 4), 5000.0)]);
    }

    #[test]
    fn legacy_weekly_files_are_read_at_cost() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.write_snapshot(&snapshot(date(3, 4), 5000.0)).unwrap();
        fs::write(
            dir.path().join("performance").join("performance_weekly_2024-03-01.csv"),
            "date,cash,portfolio_value,total_equity\n2024-03-01,4990.0,10.0,5000.0\n",
        )
        .unwrap();

        let read = store.read_snapshots().unwrap();

        assert_eq!(read.len(), 2);
        assert_eq!(read[0].date, date(3, 1));
        assert_eq!(read[0].total_equity, 5000.0);
        assert_eq!(read[0].total_unrealized_pl, 0.0);
        assert_eq!(read[0].winning_positions, 0);
        assert_eq!(read[1], snapshot(date(3, 4), 5000.0));
    }

    #[test]
    fn daily_file_read_after_legacy_for_same_date() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.write_snapshot(&snapshot(date(3, 4), 5001.0)).unwrap();
        fs::write(
            dir.path().join("performance").join("performance_weekly_2024-03-04.csv"),
            "date,cash,portfolio_value,total_equity\n2024-03-04,4990.0,10.0,5000.0\n",
        )
        .unwrap();

        let read = store.read_snapshots().unwrap();

        assert_eq!(read.len(), 2);
        assert_eq!(read[1], snapshot(date(3, 4), 5001.0));
    }

    #[test]
    fn malformed_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.write_snapshot(&snapshot(date(3, 4), 5000.0)).unwrap();
        store.write_snapshot(&snapshot(date(3, 11), 5050.0)).unwrap();
        fs::write(store.snapshot_path(date(3, 6)), "date,cash\n2024-03-06,oops\n").unwrap();

        let read = store.read_snapshots().unwrap();

        assert_eq!(
            read,
            vec![snapshot(date(3, 4), 5000.0), snapshot(date(3, 11), 5050.0)]
        );
    }

    #[test]
    fn weekly_summary_layout() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let rows = vec![
            WeeklySummaryRow {
                year: 2024,
                week_number: 10,
                start_date: date(3, 4),
                end_date: date(3, 10),
                weekly_pl: None,
                win_loss: None,
            },
            WeeklySummaryRow {
                year: 2024,
                week_number: 11,
                start_date: date(3, 11),
                end_date: date(3, 17),
                weekly_pl: Some(-2.5),
                win_loss: Some(WinLoss::Loss),
            },
        ];

        store.write_weekly_summary(&rows).unwrap();
        let content = fs::read_to_string(dir.path().join("weekly_summary.csv")).unwrap();

        assert_eq!(
            content,
            "year,week_number,start_date,end_date,weekly_pl,win_loss\n\
             2024,10,2024-03-04,2024-03-10,,\n\
             2024,11,2024-03-11,2024-03-17,-2.5,LOSS\n"
        );
    }

    #[test]
    fn empty_weekly_summary_has_header() {
        let dir = TempDir::new().unwrap();
        store(&dir).write_weekly_summary(&[]).unwrap();
        let content = fs::read_to_string(dir.path().join("weekly_summary.csv")).unwrap();
        assert_eq!(content, "year,week_number,start_date,end_date,weekly_pl,win_loss\n");
    }
}
