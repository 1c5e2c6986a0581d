//! Performance snapshot and weekly summary port trait.

use crate::domain::error::PapertraderError;
use crate::domain::snapshot::PerformanceSnapshot;
use crate::domain::weekly::WeeklySummaryRow;

pub trait SnapshotStore {
    /// Write the snapshot for its date, replacing any earlier one.
    fn write_snapshot(&self, snapshot: &PerformanceSnapshot) -> Result<(), PapertraderError>;

    /// Every stored snapshot, in no guaranteed order.
    fn read_snapshots(&self) -> Result<Vec<PerformanceSnapshot>, PapertraderError>;

    /// Replace the weekly summary with `rows`.
    fn write_weekly_summary(&self, rows: &[WeeklySummaryRow]) -> Result<(), PapertraderError>;
}
