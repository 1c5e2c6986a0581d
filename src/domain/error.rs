//! Domain error types.

use chrono::NaiveDate;

use super::universe::UniverseError;

/// Top-level error type for papertrader.
#[derive(Debug, thiserror::Error)]
pub enum PapertraderError {
    #[error("fetch failed: {reason}")]
    Fetch { reason: String },

    #[error("invalid order for {symbol}: {reason}")]
    InvalidOrder { symbol: String, reason: String },

    #[error("insufficient position in {symbol}: requested {requested}, held {held}")]
    InsufficientPosition {
        symbol: String,
        requested: f64,
        held: f64,
    },

    #[error("no price data for {symbol}")]
    MissingPriceData { symbol: String },

    #[error("duplicate performance snapshot for {date}")]
    DuplicateSnapshot { date: NaiveDate },

    #[error("storage error at {path}: {reason}")]
    Storage { path: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    /// A multi-store save failed after some stores were already written.
    #[error("{failed} not saved ({} already saved): {source}", .written.join(", "))]
    PartialWrite {
        written: Vec<String>,
        failed: String,
        source: Box<PapertraderError>,
    },

    #[error("invalid universe: {0}")]
    Universe(#[from] UniverseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PapertraderError {
    pub fn storage(path: &std::path::Path, reason: impl std::fmt::Display) -> Self {
        PapertraderError::Storage {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<&PapertraderError> for std::process::ExitCode {
    fn from(err: &PapertraderError) -> Self {
        let code: u8 = match err {
            PapertraderError::PartialWrite { source, .. } => return Self::from(source.as_ref()),
            PapertraderError::Io(_) | PapertraderError::Storage { .. } => 1,
            PapertraderError::ConfigParse { .. }
            | PapertraderError::ConfigMissing { .. }
            | PapertraderError::ConfigInvalid { .. }
            | PapertraderError::Universe(_) => 2,
            PapertraderError::Fetch { .. } | PapertraderError::MissingPriceData { .. } => 3,
            PapertraderError::InvalidOrder { .. }
            | PapertraderError::InsufficientPosition { .. } => 4,
            PapertraderError::DuplicateSnapshot { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
