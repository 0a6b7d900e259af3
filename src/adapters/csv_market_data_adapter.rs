//! CSV file market data adapter.
//!
//! One `<SYMBOL>.csv` file per symbol under the price directory, with
//! `date,close` rows. Stands in for a networked quote source behind the
//! same port.

use crate::domain::error::PapertraderError;
use crate::domain::price::ClosePrice;
use crate::ports::market_data_port::MarketDataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvMarketDataAdapter {
    price_dir: PathBuf,
}

impl CsvMarketDataAdapter {
    pub fn new(price_dir: PathBuf) -> Self {
        Self { price_dir }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.price_dir.join(format!("{}.csv", symbol))
    }

    fn read_all(&self, symbol: &str) -> Result<Vec<ClosePrice>, PapertraderError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| PapertraderError::MarketData {
            symbol: symbol.to_string(),
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut prices = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| PapertraderError::MarketData {
                symbol: symbol.to_string(),
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(0).ok_or_else(|| PapertraderError::MarketData {
                symbol: symbol.to_string(),
                reason: "missing date column".into(),
            })?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                PapertraderError::MarketData {
                    symbol: symbol.to_string(),
                    reason: format!("invalid date format: {}", e),
                }
            })?;

            let close: f64 = record
                .get(1)
                .ok_or_else(|| PapertraderError::MarketData {
                    symbol: symbol.to_string(),
                    reason: "missing close column".into(),
                })?
                .parse()
                .map_err(|e| PapertraderError::MarketData {
                    symbol: symbol.to_string(),
                    reason: format!("invalid close value: {}", e),
                })?;

            prices.push(ClosePrice {
                symbol: symbol.to_string(),
                date,
                close,
            });
        }

        prices.sort_by_key(|p| p.date);
        Ok(prices)
    }
}

impl MarketDataPort for CsvMarketDataAdapter {
    fn fetch_price_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ClosePrice>, PapertraderError> {
        let mut prices = self.read_all(symbol)?;
        prices.retain(|p| p.date >= start && p.date <= end);
        Ok(prices)
    }

    fn fetch_current_price(&self, symbol: &str) -> Result<f64, PapertraderError> {
        let prices = self.read_all(symbol)?;
        prices
            .last()
            .map(|p| p.close)
            .ok_or_else(|| PapertraderError::MarketData {
                symbol: symbol.to_string(),
                reason: "no price data".into(),
            })
    }
}
