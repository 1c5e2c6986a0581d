//! Stock universe: symbol normalization and truncation.
//!
//! Symbols are stored in the price-feed form: upper case, with share-class
//! dots replaced by dashes (`BRK.B` -> `BRK-B`).

use std::collections::HashSet;

pub const DEFAULT_UNIVERSE_SIZE: usize = 500;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),

    #[error("universe is empty")]
    Empty,
}

pub fn normalize_symbol(raw: &str) -> String {
    raw.trim().to_uppercase().replace('.', "-")
}

/// Parse a comma-separated symbol list, preserving order.
pub fn parse_symbols(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        if token.trim().is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let symbol = normalize_symbol(token);
        if !seen.insert(symbol.clone()) {
            return Err(UniverseError::DuplicateSymbol(symbol));
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}

/// Normalize, drop blanks and repeats, and keep the first `size` symbols.
pub fn select_universe(raw: Vec<String>, size: usize) -> Result<Vec<String>, UniverseError> {
    let mut seen = HashSet::new();
    let symbols: Vec<String> = raw
        .iter()
        .map(|s| normalize_symbol(s))
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.clone()))
        .take(size)
        .collect();

    if symbols.is_empty() {
        return Err(UniverseError::Empty);
    }
    Ok(symbols)
}
