//! Ledger persistence port trait.

use crate::domain::error::PapertraderError;
use crate::domain::ledger::Ledger;

pub trait LedgerStore {
    /// Load the persisted ledger, or a fresh all-cash ledger if none exists.
    fn load(&self) -> Result<Ledger, PapertraderError>;

    /// Replace the persisted ledger. Implementations must not leave a
    /// partially written ledger behind.
    fn save(&self, ledger: &Ledger) -> Result<(), PapertraderError>;
}
