#![allow(dead_code)]

use chrono::NaiveDate;
use papertrader::domain::engine::EngineRules;
use papertrader::domain::error::PapertraderError;
use papertrader::domain::holding::Holding;
use papertrader::domain::portfolio::PortfolioState;
pub use papertrader::domain::price::ClosePrice;
use papertrader::ports::market_data_port::MarketDataPort;
use std::collections::HashMap;

pub struct MockMarketDataPort {
    pub history: HashMap<String, Vec<ClosePrice>>,
    pub current: HashMap<String, f64>,
    pub errors: HashMap<String, String>,
}

impl MockMarketDataPort {
    pub fn new() -> Self {
        Self {
            history: HashMap::new(),
            current: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_history(mut self, symbol: &str, prices: Vec<ClosePrice>) -> Self {
        self.history.insert(symbol.to_string(), prices);
        self
    }

    /// Two-point window: earliest close seven days before `end`, latest at `end`.
    pub fn with_window(self, symbol: &str, end: NaiveDate, earliest: f64, latest: f64) -> Self {
        let series = vec![
            price(symbol, end - chrono::Duration::days(7), earliest),
            price(symbol, end, latest),
        ];
        self.with_history(symbol, series)
    }

    pub fn with_current(mut self, symbol: &str, quote: f64) -> Self {
        self.current.insert(symbol.to_string(), quote);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl MarketDataPort for MockMarketDataPort {
    fn fetch_price_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ClosePrice>, PapertraderError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(PapertraderError::MarketData {
                symbol: symbol.to_string(),
                reason: reason.clone(),
            });
        }
        let mut series = self.history.get(symbol).cloned().unwrap_or_default();
        series.retain(|p| p.date >= start && p.date <= end);
        Ok(series)
    }

    fn fetch_current_price(&self, symbol: &str) -> Result<f64, PapertraderError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(PapertraderError::MarketData {
                symbol: symbol.to_string(),
                reason: reason.clone(),
            });
        }
        self.current
            .get(symbol)
            .copied()
            .or_else(|| {
                self.history
                    .get(symbol)
                    .and_then(|series| series.last().map(|p| p.close))
            })
            .ok_or_else(|| PapertraderError::MarketData {
                symbol: symbol.to_string(),
                reason: "no quote".into(),
            })
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn price(symbol: &str, date: NaiveDate, close: f64) -> ClosePrice {
    ClosePrice {
        symbol: symbol.to_string(),
        date,
        close,
    }
}

pub fn universe(symbols: &[&str]) -> Vec<String> {
    symbols.iter().map(|s| s.to_string()).collect()
}

pub fn held(symbol: &str, quantity: f64, avg_cost: f64) -> Holding {
    Holding {
        symbol: symbol.to_string(),
        quantity,
        avg_cost,
        last_buy_date: Some(date(2026, 7, 1)),
        last_sell_date: None,
    }
}

pub fn portfolio_with(cash: f64, holdings: Vec<Holding>) -> PortfolioState {
    let mut state = PortfolioState::new(cash);
    for holding in holdings {
        state.insert_holding(holding);
    }
    state
}

pub fn default_rules() -> EngineRules {
    EngineRules::default()
}
