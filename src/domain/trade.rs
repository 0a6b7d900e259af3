//! Immutable trade log records.

use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            other => Err(format!("unknown trade side: {other}")),
        }
    }
}

/// One executed paper trade. Written once, never mutated; chronological
/// append order in the trade log is the source of truth.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub date: NaiveDate,
    pub symbol: String,
    pub side: Side,
    /// Dollar value transacted.
    pub amount: f64,
    /// Units transacted (fractional shares permitted).
    pub quantity: f64,
    /// Price at execution.
    pub price: f64,
    /// Cash balance immediately after the fill.
    pub cash_after: f64,
}
