//! Weekly performance aggregation: equity snapshots and the derived summary.

use chrono::{Datelike, Duration, NaiveDate};
use std::fmt;
use std::str::FromStr;

use super::portfolio::PortfolioState;
use crate::ports::market_data_port::MarketDataPort;

/// Absolute P&L at or below this counts as FLAT (absorbs float rounding).
pub const FLAT_EPSILON: f64 = 0.005;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodOutcome {
    Win,
    Loss,
    Flat,
}

impl fmt::Display for PeriodOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodOutcome::Win => write!(f, "WIN"),
            PeriodOutcome::Loss => write!(f, "LOSS"),
            PeriodOutcome::Flat => write!(f, "FLAT"),
        }
    }
}

impl FromStr for PeriodOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WIN" => Ok(PeriodOutcome::Win),
            "LOSS" => Ok(PeriodOutcome::Loss),
            "FLAT" => Ok(PeriodOutcome::Flat),
            other => Err(format!("unknown period outcome: {other}")),
        }
    }
}

pub fn classify(weekly_pl: f64) -> PeriodOutcome {
    if weekly_pl > FLAT_EPSILON {
        PeriodOutcome::Win
    } else if weekly_pl < -FLAT_EPSILON {
        PeriodOutcome::Loss
    } else {
        PeriodOutcome::Flat
    }
}

/// One immutable recorded evaluation, appended per period.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceSnapshot {
    pub year: i32,
    pub week: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub cash: f64,
    pub invested: f64,
    pub equity: f64,
    pub weekly_pl: f64,
    pub outcome: PeriodOutcome,
}

/// Derived view over the snapshot sequence: snapshot schema minus the
/// intermediate cash/invested fields. Rebuildable at any time.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub year: i32,
    pub week: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub equity: f64,
    pub weekly_pl: f64,
    pub outcome: PeriodOutcome,
}

/// Mark-to-market detail for one holding at evaluation time.
#[derive(Debug, Clone, PartialEq)]
pub struct HoldingValuation {
    pub symbol: String,
    pub quantity: f64,
    pub book_cost: f64,
    pub market_value: f64,
    pub unrealized_pl: f64,
}

#[derive(Debug)]
pub struct EvaluationResult {
    pub snapshot: PerformanceSnapshot,
    pub valuations: Vec<HoldingValuation>,
    /// Symbols whose price could not be fetched; their value is omitted
    /// from this period's aggregate.
    pub skipped: Vec<(String, String)>,
}

/// ISO-8601 period bounds for the week containing `date`:
/// (iso year, iso week number, Monday, Friday). Reproducible from the
/// evaluation date alone.
pub fn week_bounds(date: NaiveDate) -> (i32, u32, NaiveDate, NaiveDate) {
    let iso = date.iso_week();
    let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
    let friday = monday + Duration::days(4);
    (iso.year(), iso.week(), monday, friday)
}

/// Evaluate the portfolio for the week containing `eval_date`.
///
/// Pure function of its inputs: identical state and prices produce an
/// identical snapshot for the same period.
pub fn run_weekly_evaluation(
    portfolio: &PortfolioState,
    data: &dyn MarketDataPort,
    prior: Option<&PerformanceSnapshot>,
    starting_capital: f64,
    eval_date: NaiveDate,
) -> EvaluationResult {
    let mut valuations = Vec::new();
    let mut skipped = Vec::new();
    let mut invested = 0.0;

    for holding in portfolio.holdings_sorted() {
        let price = match data.fetch_current_price(&holding.symbol) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("warning: skipping {} ({})", holding.symbol, e);
                skipped.push((holding.symbol.clone(), e.to_string()));
                continue;
            }
        };
        let market_value = holding.market_value(price);
        invested += market_value;
        valuations.push(HoldingValuation {
            symbol: holding.symbol.clone(),
            quantity: holding.quantity,
            book_cost: holding.book_cost(),
            market_value,
            unrealized_pl: holding.unrealized_pnl(price),
        });
    }

    let equity = portfolio.cash + invested;
    let baseline = prior.map(|s| s.equity).unwrap_or(starting_capital);
    let weekly_pl = equity - baseline;
    let (year, week, start_date, end_date) = week_bounds(eval_date);

    EvaluationResult {
        snapshot: PerformanceSnapshot {
            year,
            week,
            start_date,
            end_date,
            cash: portfolio.cash,
            invested,
            equity,
            weekly_pl,
            outcome: classify(weekly_pl),
        },
        valuations,
        skipped,
    }
}

/// Rebuild the summary view from the full snapshot sequence.
pub fn build_summary(snapshots: &[PerformanceSnapshot]) -> Vec<SummaryRow> {
    snapshots
        .iter()
        .map(|s| SummaryRow {
            year: s.year,
            week: s.week,
            start_date: s.start_date,
            end_date: s.end_date,
            equity: s.equity,
            weekly_pl: s.weekly_pl,
            outcome: s.outcome,
        })
        .collect()
}
