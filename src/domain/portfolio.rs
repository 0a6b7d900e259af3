//! Portfolio state: cash plus the set of open holdings.

use std::collections::HashMap;

use super::holding::Holding;

/// The persisted portfolio, passed explicitly into and out of each cycle.
/// Persistence is a load/save boundary, never ambient global state.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioState {
    pub cash: f64,
    pub holdings: HashMap<String, Holding>,
}

impl PortfolioState {
    pub fn new(starting_cash: f64) -> Self {
        PortfolioState {
            cash: starting_cash,
            holdings: HashMap::new(),
        }
    }

    pub fn holding(&self, symbol: &str) -> Option<&Holding> {
        self.holdings.get(symbol)
    }

    pub fn has_holding(&self, symbol: &str) -> bool {
        self.holdings.contains_key(symbol)
    }

    pub fn insert_holding(&mut self, holding: Holding) {
        self.holdings.insert(holding.symbol.clone(), holding);
    }

    pub fn remove_holding(&mut self, symbol: &str) -> Option<Holding> {
        self.holdings.remove(symbol)
    }

    pub fn holding_count(&self) -> usize {
        self.holdings.len()
    }

    /// Holdings sorted by symbol, for deterministic iteration and output.
    pub fn holdings_sorted(&self) -> Vec<&Holding> {
        let mut all: Vec<&Holding> = self.holdings.values().collect();
        all.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        all
    }

    /// Market value of all holdings priced from `price_map`. Symbols absent
    /// from the map contribute nothing.
    pub fn invested_value(&self, price_map: &HashMap<String, f64>) -> f64 {
        self.holdings
            .values()
            .filter_map(|h| price_map.get(&h.symbol).map(|&p| h.market_value(p)))
            .sum()
    }

    pub fn total_equity(&self, price_map: &HashMap<String, f64>) -> f64 {
        self.cash + self.invested_value(price_map)
    }
}
