//! Market data access port trait.
//!
//! Both operations may fail per symbol; callers decide skip-vs-abort.

use crate::domain::error::PapertraderError;
use crate::domain::price::ClosePrice;
use chrono::NaiveDate;

pub trait MarketDataPort {
    /// Close-price series for `symbol` within `[start, end]`, sorted
    /// ascending by date.
    fn fetch_price_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ClosePrice>, PapertraderError>;

    /// Most recent available price for `symbol`.
    fn fetch_current_price(&self, symbol: &str) -> Result<f64, PapertraderError>;
}
