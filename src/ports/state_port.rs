//! Persistence port trait for portfolio state and performance history.
//!
//! The engine owns the portfolio state and trade log (sole writer); the
//! aggregator owns snapshots and the summary and only reads portfolio
//! state. Implementations must write atomically so a concurrent reader
//! never observes a partially-updated file.

use crate::domain::error::PapertraderError;
use crate::domain::performance::{PerformanceSnapshot, SummaryRow};
use crate::domain::portfolio::PortfolioState;
use crate::domain::trade::TradeRecord;

pub trait StatePort {
    /// Load holdings and cash. Absent state initializes to defaults
    /// (empty holdings, `starting_capital` cash); unreadable or malformed
    /// state is an error, never a silent reset.
    fn load_portfolio(&self, starting_capital: f64) -> Result<PortfolioState, PapertraderError>;

    /// Full rewrite of holdings and cash.
    fn save_portfolio(&self, state: &PortfolioState) -> Result<(), PapertraderError>;

    /// Append executed trades to the trade log, preserving order.
    fn append_trades(&self, trades: &[TradeRecord]) -> Result<(), PapertraderError>;

    /// The full trade log in append order (empty on first run).
    fn load_trades(&self) -> Result<Vec<TradeRecord>, PapertraderError>;

    /// All recorded snapshots in period order (empty on first run).
    fn load_snapshots(&self) -> Result<Vec<PerformanceSnapshot>, PapertraderError>;

    fn append_snapshot(&self, snapshot: &PerformanceSnapshot) -> Result<(), PapertraderError>;

    /// Full rewrite of the derived summary table.
    fn write_summary(&self, rows: &[SummaryRow]) -> Result<(), PapertraderError>;
}
