//! Domain error types.

use super::universe::UniverseError;

/// Top-level error type for papertrader.
#[derive(Debug, thiserror::Error)]
pub enum PapertraderError {
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

    #[error("corrupt state file {file}: {reason}")]
    StateCorrupt { file: String, reason: String },

    #[error("market data error for {symbol}: {reason}")]
    MarketData { symbol: String, reason: String },

    #[error(transparent)]
    Universe(#[from] UniverseError),

    #[error("universe is empty: {reason}")]
    UniverseEmpty { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&PapertraderError> for std::process::ExitCode {
    fn from(err: &PapertraderError) -> Self {
        let code: u8 = match err {
            PapertraderError::Io(_) => 1,
            PapertraderError::ConfigParse { .. }
            | PapertraderError::ConfigMissing { .. }
            | PapertraderError::ConfigInvalid { .. } => 2,
            PapertraderError::StateCorrupt { .. } => 3,
            PapertraderError::MarketData { .. } => 4,
            PapertraderError::Universe(_) | PapertraderError::UniverseEmpty { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
