//! Daily portfolio engine: threshold rules and portfolio state transition.
//!
//! One cycle evaluates every universe symbol against the lookback-window
//! percentage change and applies the buy/sell rules. Per-symbol data faults
//! skip that symbol only; they never abort the batch. The cycle is a
//! deterministic function of its inputs, and intentionally not idempotent:
//! each scheduled run is one independent trading decision.

use chrono::{Duration, NaiveDate};

use super::holding::Holding;
use super::portfolio::PortfolioState;
use super::price::{latest_close, pct_change_over_window};
use super::trade::{Side, TradeRecord};
use crate::ports::market_data_port::MarketDataPort;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineRules {
    /// Dollar amount of each buy.
    pub buy_amount: f64,
    /// Maximum dollar amount of each sell.
    pub sell_amount: f64,
    /// Buy when the window change is at or below this (negative) percentage.
    pub drop_pct: f64,
    /// Sell when the window change is at or above this (positive) percentage.
    pub gain_pct: f64,
    /// Calendar days of price history behind the evaluation date.
    pub lookback_days: i64,
}

impl Default for EngineRules {
    fn default() -> Self {
        EngineRules {
            buy_amount: 5.0,
            sell_amount: 10.0,
            drop_pct: -5.0,
            gain_pct: 10.0,
            lookback_days: 7,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone)]
pub enum SkipReason {
    FetchFailed(String),
    InsufficientHistory { points: usize },
    UnusablePrice,
}

#[derive(Debug)]
pub struct CycleResult {
    pub portfolio: PortfolioState,
    pub trades: Vec<TradeRecord>,
    pub skipped: Vec<SkippedSymbol>,
}

/// Buy a fixed dollar amount of `symbol` at `price`. The caller has already
/// verified cash covers the amount; quantity is `amount / price`.
pub fn execute_buy(
    portfolio: &mut PortfolioState,
    symbol: &str,
    price: f64,
    amount: f64,
    date: NaiveDate,
) -> TradeRecord {
    let quantity = amount / price;
    match portfolio.holdings.get_mut(symbol) {
        Some(holding) => holding.apply_buy(quantity, price, date),
        None => portfolio.insert_holding(Holding::open(symbol, quantity, price, date)),
    }
    portfolio.cash -= amount;

    TradeRecord {
        date,
        symbol: symbol.to_string(),
        side: Side::Buy,
        amount,
        quantity,
        price,
        cash_after: portfolio.cash,
    }
}

/// Sell up to `max_amount` worth of `symbol` at `price`, capped at the held
/// quantity's market value. Returns `None` when the symbol is not held
/// (no short selling). A position sold down to zero is removed.
pub fn execute_sell(
    portfolio: &mut PortfolioState,
    symbol: &str,
    price: f64,
    max_amount: f64,
    date: NaiveDate,
) -> Option<TradeRecord> {
    let holding = portfolio.holdings.get_mut(symbol)?;
    let proceeds = max_amount.min(holding.quantity * price);
    let quantity = proceeds / price;

    holding.apply_sell(quantity, date);
    if holding.is_depleted() {
        portfolio.remove_holding(symbol);
    }
    portfolio.cash += proceeds;

    Some(TradeRecord {
        date,
        symbol: symbol.to_string(),
        side: Side::Sell,
        amount: proceeds,
        quantity,
        price,
        cash_after: portfolio.cash,
    })
}

/// Run one daily cycle over the universe.
///
/// The buy and sell thresholds are disjoint in sign, so at most one rule can
/// fire per symbol per cycle; no explicit exclusivity check is needed.
pub fn run_daily_cycle(
    universe: &[String],
    data: &dyn MarketDataPort,
    mut portfolio: PortfolioState,
    rules: &EngineRules,
    today: NaiveDate,
) -> CycleResult {
    let start = today - Duration::days(rules.lookback_days);
    let mut trades = Vec::new();
    let mut skipped = Vec::new();

    for symbol in universe {
        let history = match data.fetch_price_history(symbol, start, today) {
            Ok(series) => series,
            Err(e) => {
                eprintln!("warning: skipping {} ({})", symbol, e);
                skipped.push(SkippedSymbol {
                    symbol: symbol.clone(),
                    reason: SkipReason::FetchFailed(e.to_string()),
                });
                continue;
            }
        };

        let change = match pct_change_over_window(&history) {
            Some(c) => c,
            None => {
                if history.len() < 2 {
                    eprintln!(
                        "warning: skipping {} ({} price points, need 2)",
                        symbol,
                        history.len()
                    );
                    skipped.push(SkippedSymbol {
                        symbol: symbol.clone(),
                        reason: SkipReason::InsufficientHistory {
                            points: history.len(),
                        },
                    });
                } else {
                    eprintln!("warning: skipping {} (non-positive base price)", symbol);
                    skipped.push(SkippedSymbol {
                        symbol: symbol.clone(),
                        reason: SkipReason::UnusablePrice,
                    });
                }
                continue;
            }
        };

        let price = match latest_close(&history) {
            Some(p) if p > 0.0 => p,
            _ => {
                eprintln!("warning: skipping {} (non-positive latest price)", symbol);
                skipped.push(SkippedSymbol {
                    symbol: symbol.clone(),
                    reason: SkipReason::UnusablePrice,
                });
                continue;
            }
        };

        if change <= rules.drop_pct {
            if portfolio.cash < rules.buy_amount {
                eprintln!(
                    "warning: skipping buy of {} (cash ${:.2} below ${:.2})",
                    symbol, portfolio.cash, rules.buy_amount
                );
                continue;
            }
            trades.push(execute_buy(
                &mut portfolio,
                symbol,
                price,
                rules.buy_amount,
                today,
            ));
        } else if change >= rules.gain_pct {
            if let Some(trade) =
                execute_sell(&mut portfolio, symbol, price, rules.sell_amount, today)
            {
                trades.push(trade);
            }
        }
    }

    CycleResult {
        portfolio,
        trades,
        skipped,
    }
}
