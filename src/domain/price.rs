//! Close-price series and lookback-window math.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct ClosePrice {
    pub symbol: String,
    pub date: NaiveDate,
    pub close: f64,
}

/// Percentage change from the earliest to the latest close in `series`.
///
/// The series must be sorted ascending by date (adapters guarantee this).
/// Returns `None` when the window cannot be evaluated: fewer than 2 points,
/// or a non-positive base price.
pub fn pct_change_over_window(series: &[ClosePrice]) -> Option<f64> {
    if series.len() < 2 {
        return None;
    }
    let earliest = series.first()?.close;
    let latest = series.last()?.close;
    if earliest <= 0.0 {
        return None;
    }
    Some((latest - earliest) / earliest * 100.0)
}

/// Most recent close in the series.
pub fn latest_close(series: &[ClosePrice]) -> Option<f64> {
    series.last().map(|p| p.close)
}
