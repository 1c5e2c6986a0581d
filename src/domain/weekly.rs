//! Weekly aggregation of performance snapshots by ISO week.
//!
//! Weeks are compared with their calendar predecessor, not the previous row:
//! a week whose preceding ISO week has no snapshots gets no P/L. The summary
//! is rebuilt from the full snapshot set every time.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

use super::error::PapertraderError;
use super::snapshot::PerformanceSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WinLoss {
    Win,
    Loss,
    Flat,
}

impl WinLoss {
    pub fn classify(pl: f64) -> Self {
        if pl > 0.0 {
            WinLoss::Win
        } else if pl < 0.0 {
            WinLoss::Loss
        } else {
            WinLoss::Flat
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklySummaryRow {
    pub year: i32,
    pub week_number: u32,
    /// Monday of the ISO week.
    pub start_date: NaiveDate,
    /// Sunday of the ISO week.
    pub end_date: NaiveDate,
    pub weekly_pl: Option<f64>,
    pub win_loss: Option<WinLoss>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeeklySummary {
    pub rows: Vec<WeeklySummaryRow>,
    /// Dates seen more than once in the input. The last occurrence was kept.
    pub duplicate_dates: Vec<NaiveDate>,
}

impl WeeklySummary {
    pub fn wins(&self) -> usize {
        self.count(WinLoss::Win)
    }

    pub fn losses(&self) -> usize {
        self.count(WinLoss::Loss)
    }

    fn count(&self, wl: WinLoss) -> usize {
        self.rows.iter().filter(|r| r.win_loss == Some(wl)).count()
    }
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

fn week_key(date: NaiveDate) -> (i32, u32) {
    let iso = date.iso_week();
    (iso.year(), iso.week())
}

/// Sort ascending by date, keeping the last snapshot given for any date.
pub fn dedupe_snapshots(
    snapshots: Vec<PerformanceSnapshot>,
) -> (Vec<PerformanceSnapshot>, Vec<NaiveDate>) {
    let mut by_date: BTreeMap<NaiveDate, PerformanceSnapshot> = BTreeMap::new();
    let mut duplicates = Vec::new();

    for snapshot in snapshots {
        let date = snapshot.date;
        if by_date.insert(date, snapshot).is_some() {
            let err = PapertraderError::DuplicateSnapshot { date };
            warn!(error = %err, "keeping latest snapshot");
            duplicates.push(date);
        }
    }

    (by_date.into_values().collect(), duplicates)
}

pub fn aggregate_weekly(snapshots: Vec<PerformanceSnapshot>) -> WeeklySummary {
    let (ordered, duplicate_dates) = dedupe_snapshots(snapshots);

    // (iso_year, week) -> (monday, last equity in that week)
    let mut weeks: BTreeMap<(i32, u32), (NaiveDate, f64)> = BTreeMap::new();
    for snapshot in &ordered {
        weeks.insert(
            week_key(snapshot.date),
            (week_start(snapshot.date), snapshot.total_equity),
        );
    }

    let rows = weeks
        .iter()
        .map(|(&(year, week_number), &(start_date, equity))| {
            let previous = week_key(start_date - Duration::days(7));
            let weekly_pl = weeks.get(&previous).map(|&(_, prev_equity)| equity - prev_equity);
            WeeklySummaryRow {
                year,
                week_number,
                start_date,
                end_date: start_date + Duration::days(6),
                weekly_pl,
                win_loss: weekly_pl.map(WinLoss::classify),
            }
        })
        .collect();

    WeeklySummary {
        rows,
        duplicate_dates,
    }
}
