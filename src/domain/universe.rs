//! Trading-universe parsing.
//!
//! The universe is re-read each cycle (dynamic membership). Symbols are
//! normalized to uppercase; duplicates are an input error.

use std::collections::HashSet;

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("duplicate symbol in universe: {0}")]
    DuplicateSymbol(String),
}

/// Parse a universe listing: one symbol per line, `#` starts a comment,
/// blank lines ignored. Commas also act as separators so a single-line
/// listing works too.
pub fn parse_symbols(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for line in input.lines() {
        let line = match line.find('#') {
            Some(idx) => &line[..idx],
            None => line,
        };
        for token in line.split(',') {
            let trimmed = token.trim();
            if trimmed.is_empty() {
                continue;
            }
            let symbol = trimmed.to_uppercase();
            if seen.contains(&symbol) {
                return Err(UniverseError::DuplicateSymbol(symbol));
            }
            seen.insert(symbol.clone());
            symbols.push(symbol);
        }
    }

    Ok(symbols)
}
