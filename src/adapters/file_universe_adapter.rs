//! File-backed universe adapter.
//!
//! Reads the tradable symbol list from a plain text file, one symbol per
//! line (`#` comments allowed). Re-read on every cycle so membership can
//! change between runs.

use crate::domain::error::PapertraderError;
use crate::domain::universe::parse_symbols;
use crate::ports::universe_port::UniversePort;
use std::fs;
use std::path::PathBuf;

pub struct FileUniverseAdapter {
    path: PathBuf,
}

impl FileUniverseAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl UniversePort for FileUniverseAdapter {
    fn fetch_universe(&self) -> Result<Vec<String>, PapertraderError> {
        let content = fs::read_to_string(&self.path)?;
        Ok(parse_symbols(&content)?)
    }
}
