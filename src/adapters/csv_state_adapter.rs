//! CSV file persistence adapter.
//!
//! All state lives as flat CSV tables under one directory:
//! `portfolio.csv` + `cash.csv` (full rewrite each cycle), `trades.csv`
//! (append-only), `snapshots.csv` (append-only), `summary.csv` (derived,
//! full rewrite). Rewrites go through a temp file and rename so a reader
//! never observes a partially-written table.

use crate::domain::error::PapertraderError;
use crate::domain::holding::Holding;
use crate::domain::performance::{PerformanceSnapshot, PeriodOutcome, SummaryRow};
use crate::domain::portfolio::PortfolioState;
use crate::domain::trade::{Side, TradeRecord};
use crate::ports::state_port::StatePort;
use chrono::NaiveDate;
use std::fmt;
use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;

const DATE_FORMAT: &str = "%Y-%m-%d";

const PORTFOLIO_HEADER: &str = "symbol,quantity,avg_cost,last_buy_date,last_sell_date";
const CASH_HEADER: &str = "cash";
const TRADES_HEADER: &str = "date,symbol,side,amount,quantity,price,cash_after";
const SNAPSHOTS_HEADER: &str =
    "year,week,start_date,end_date,cash,invested,equity,weekly_pl,outcome";
const SUMMARY_HEADER: &str = "year,week,start_date,end_date,equity,weekly_pl,outcome";

pub struct CsvStateAdapter {
    state_dir: PathBuf,
}

impl CsvStateAdapter {
    pub fn new(state_dir: PathBuf) -> Self {
        Self { state_dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.state_dir.join(name)
    }

    fn corrupt(&self, name: &str, reason: impl fmt::Display) -> PapertraderError {
        PapertraderError::StateCorrupt {
            file: self.path(name).display().to_string(),
            reason: reason.to_string(),
        }
    }

    fn read_records(&self, name: &str) -> Result<Vec<csv::StringRecord>, PapertraderError> {
        let content = fs::read_to_string(self.path(name))?;
        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut records = Vec::new();
        for result in rdr.records() {
            records.push(result.map_err(|e| self.corrupt(name, e))?);
        }
        Ok(records)
    }

    fn field<'a>(
        &self,
        record: &'a csv::StringRecord,
        idx: usize,
        name: &str,
        file: &str,
    ) -> Result<&'a str, PapertraderError> {
        record
            .get(idx)
            .ok_or_else(|| self.corrupt(file, format!("missing {} column", name)))
    }

    fn parse_field<T: FromStr>(
        &self,
        record: &csv::StringRecord,
        idx: usize,
        name: &str,
        file: &str,
    ) -> Result<T, PapertraderError>
    where
        T::Err: fmt::Display,
    {
        self.field(record, idx, name, file)?
            .parse()
            .map_err(|e| self.corrupt(file, format!("invalid {} value: {}", name, e)))
    }

    fn parse_date(
        &self,
        record: &csv::StringRecord,
        idx: usize,
        name: &str,
        file: &str,
    ) -> Result<NaiveDate, PapertraderError> {
        let value = self.field(record, idx, name, file)?;
        NaiveDate::parse_from_str(value, DATE_FORMAT)
            .map_err(|e| self.corrupt(file, format!("invalid {} value: {}", name, e)))
    }

    fn parse_optional_date(
        &self,
        record: &csv::StringRecord,
        idx: usize,
        name: &str,
        file: &str,
    ) -> Result<Option<NaiveDate>, PapertraderError> {
        let value = self.field(record, idx, name, file)?;
        if value.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(value, DATE_FORMAT)
            .map(Some)
            .map_err(|e| self.corrupt(file, format!("invalid {} value: {}", name, e)))
    }

    /// Write the full content through a temp file and rename into place.
    fn write_atomic(&self, name: &str, content: &str) -> Result<(), PapertraderError> {
        fs::create_dir_all(&self.state_dir)?;
        let path = self.path(name);
        let tmp = path.with_extension("csv.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// Append rows to a log file, writing the header first when the file is new.
    fn append_rows(&self, name: &str, header: &str, rows: &[String]) -> Result<(), PapertraderError> {
        fs::create_dir_all(&self.state_dir)?;
        let path = self.path(name);
        let is_new = !path.exists();
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        if is_new {
            writeln!(file, "{}", header)?;
        }
        for row in rows {
            writeln!(file, "{}", row)?;
        }
        Ok(())
    }

    fn fmt_date(date: NaiveDate) -> String {
        date.format(DATE_FORMAT).to_string()
    }

    fn fmt_optional_date(date: Option<NaiveDate>) -> String {
        date.map(Self::fmt_date).unwrap_or_default()
    }
}

impl StatePort for CsvStateAdapter {
    fn load_portfolio(&self, starting_capital: f64) -> Result<PortfolioState, PapertraderError> {
        let portfolio_path = self.path("portfolio.csv");
        let cash_path = self.path("cash.csv");

        // First run: no state at all, initialize to defaults. Anything
        // half-present is corruption, not a fresh start.
        match (portfolio_path.exists(), cash_path.exists()) {
            (false, false) => return Ok(PortfolioState::new(starting_capital)),
            (true, false) => {
                return Err(self.corrupt("cash.csv", "holdings present but cash file missing"))
            }
            (false, true) => {
                return Err(self.corrupt("portfolio.csv", "cash present but holdings file missing"))
            }
            (true, true) => {}
        }

        let cash_records = self.read_records("cash.csv")?;
        let cash_record = cash_records
            .first()
            .ok_or_else(|| self.corrupt("cash.csv", "no cash row"))?;
        let cash: f64 = self.parse_field(cash_record, 0, "cash", "cash.csv")?;
        if cash < 0.0 {
            return Err(self.corrupt("cash.csv", "negative cash balance"));
        }

        let mut state = PortfolioState::new(cash);
        for record in self.read_records("portfolio.csv")? {
            let symbol = self.field(&record, 0, "symbol", "portfolio.csv")?.to_string();
            let quantity: f64 = self.parse_field(&record, 1, "quantity", "portfolio.csv")?;
            let avg_cost: f64 = self.parse_field(&record, 2, "avg_cost", "portfolio.csv")?;
            if quantity <= 0.0 {
                return Err(self.corrupt(
                    "portfolio.csv",
                    format!("non-positive quantity for {}", symbol),
                ));
            }
            if avg_cost <= 0.0 {
                return Err(self.corrupt(
                    "portfolio.csv",
                    format!("non-positive avg_cost for {}", symbol),
                ));
            }
            let last_buy_date =
                self.parse_optional_date(&record, 3, "last_buy_date", "portfolio.csv")?;
            let last_sell_date =
                self.parse_optional_date(&record, 4, "last_sell_date", "portfolio.csv")?;
            state.insert_holding(Holding {
                symbol,
                quantity,
                avg_cost,
                last_buy_date,
                last_sell_date,
            });
        }

        Ok(state)
    }

    fn save_portfolio(&self, state: &PortfolioState) -> Result<(), PapertraderError> {
        let mut content = String::from(PORTFOLIO_HEADER);
        content.push('\n');
        for holding in state.holdings_sorted() {
            content.push_str(&format!(
                "{},{},{},{},{}\n",
                holding.symbol,
                holding.quantity,
                holding.avg_cost,
                Self::fmt_optional_date(holding.last_buy_date),
                Self::fmt_optional_date(holding.last_sell_date),
            ));
        }
        self.write_atomic("portfolio.csv", &content)?;

        self.write_atomic("cash.csv", &format!("{}\n{}\n", CASH_HEADER, state.cash))
    }

    fn append_trades(&self, trades: &[TradeRecord]) -> Result<(), PapertraderError> {
        let rows: Vec<String> = trades
            .iter()
            .map(|t| {
                format!(
                    "{},{},{},{},{},{},{}",
                    Self::fmt_date(t.date),
                    t.symbol,
                    t.side,
                    t.amount,
                    t.quantity,
                    t.price,
                    t.cash_after,
                )
            })
            .collect();
        self.append_rows("trades.csv", TRADES_HEADER, &rows)
    }

    fn load_trades(&self) -> Result<Vec<TradeRecord>, PapertraderError> {
        if !self.path("trades.csv").exists() {
            return Ok(Vec::new());
        }
        let mut trades = Vec::new();
        for record in self.read_records("trades.csv")? {
            let side: Side = self
                .field(&record, 2, "side", "trades.csv")?
                .parse()
                .map_err(|e| self.corrupt("trades.csv", e))?;
            trades.push(TradeRecord {
                date: self.parse_date(&record, 0, "date", "trades.csv")?,
                symbol: self.field(&record, 1, "symbol", "trades.csv")?.to_string(),
                side,
                amount: self.parse_field(&record, 3, "amount", "trades.csv")?,
                quantity: self.parse_field(&record, 4, "quantity", "trades.csv")?,
                price: self.parse_field(&record, 5, "price", "trades.csv")?,
                cash_after: self.parse_field(&record, 6, "cash_after", "trades.csv")?,
            });
        }
        Ok(trades)
    }

    fn load_snapshots(&self) -> Result<Vec<PerformanceSnapshot>, PapertraderError> {
        if !self.path("snapshots.csv").exists() {
            return Ok(Vec::new());
        }
        let mut snapshots = Vec::new();
        for record in self.read_records("snapshots.csv")? {
            let outcome: PeriodOutcome = self
                .field(&record, 8, "outcome", "snapshots.csv")?
                .parse()
                .map_err(|e| self.corrupt("snapshots.csv", e))?;
            snapshots.push(PerformanceSnapshot {
                year: self.parse_field(&record, 0, "year", "snapshots.csv")?,
                week: self.parse_field(&record, 1, "week", "snapshots.csv")?,
                start_date: self.parse_date(&record, 2, "start_date", "snapshots.csv")?,
                end_date: self.parse_date(&record, 3, "end_date", "snapshots.csv")?,
                cash: self.parse_field(&record, 4, "cash", "snapshots.csv")?,
                invested: self.parse_field(&record, 5, "invested", "snapshots.csv")?,
                equity: self.parse_field(&record, 6, "equity", "snapshots.csv")?,
                weekly_pl: self.parse_field(&record, 7, "weekly_pl", "snapshots.csv")?,
                outcome,
            });
        }
        Ok(snapshots)
    }

    fn append_snapshot(&self, snapshot: &PerformanceSnapshot) -> Result<(), PapertraderError> {
        let row = format!(
            "{},{},{},{},{},{},{},{},{}",
            snapshot.year,
            snapshot.week,
            Self::fmt_date(snapshot.start_date),
            Self::fmt_date(snapshot.end_date),
            snapshot.cash,
            snapshot.invested,
            snapshot.equity,
            snapshot.weekly_pl,
            snapshot.outcome,
        );
        self.append_rows("snapshots.csv", SNAPSHOTS_HEADER, &[row])
    }

    fn write_summary(&self, rows: &[SummaryRow]) -> Result<(), PapertraderError> {
        let mut content = String::from(SUMMARY_HEADER);
        content.push('\n');
        for row in rows {
            content.push_str(&format!(
                "{},{},{},{},{},{},{}\n",
                row.year,
                row.week,
                Self::fmt_date(row.start_date),
                Self::fmt_date(row.end_date),
                row.equity,
                row.weekly_pl,
                row.outcome,
            ));
        }
        self.write_atomic("summary.csv", &content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn adapter() -> (TempDir, CsvStateAdapter) {
        let dir = TempDir::new().unwrap();
        let adapter = CsvStateAdapter::new(dir.path().to_path_buf());
        (dir, adapter)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_trade(symbol: &str, side: Side) -> TradeRecord {
        TradeRecord {
            date: date(2026, 8, 3),
            symbol: symbol.to_string(),
            side,
            amount: 5.0,
            quantity: 0.05,
            price: 100.0,
            cash_after: 4995.0,
        }
    }

    fn sample_snapshot(week: u32, equity: f64) -> PerformanceSnapshot {
        PerformanceSnapshot {
            year: 2026,
            week,
            start_date: date(2026, 8, 3),
            end_date: date(2026, 8, 7),
            cash: equity,
            invested: 0.0,
            equity,
            weekly_pl: 0.0,
            outcome: PeriodOutcome::Flat,
        }
    }

    #[test]
    fn first_run_initializes_defaults() {
        let (_dir, adapter) = adapter();
        let state = adapter.load_portfolio(5000.0).unwrap();
        assert_eq!(state.cash, 5000.0);
        assert!(state.holdings.is_empty());
    }

    #[test]
    fn portfolio_round_trips() {
        let (_dir, adapter) = adapter();
        let mut state = PortfolioState::new(4990.0);
        state.insert_holding(Holding {
            symbol: "AAPL".into(),
            quantity: 0.05,
            avg_cost: 100.0,
            last_buy_date: Some(date(2026, 8, 3)),
            last_sell_date: None,
        });
        state.insert_holding(Holding {
            symbol: "MSFT".into(),
            quantity: 0.1,
            avg_cost: 50.0,
            last_buy_date: Some(date(2026, 8, 1)),
            last_sell_date: Some(date(2026, 8, 3)),
        });

        adapter.save_portfolio(&state).unwrap();
        let loaded = adapter.load_portfolio(5000.0).unwrap();

        assert_eq!(loaded, state);
    }

    #[test]
    fn save_overwrites_previous_state() {
        let (_dir, adapter) = adapter();
        let mut state = PortfolioState::new(4990.0);
        state.insert_holding(Holding::open("AAPL", 0.05, 100.0, date(2026, 8, 3)));
        adapter.save_portfolio(&state).unwrap();

        let empty = PortfolioState::new(5005.0);
        adapter.save_portfolio(&empty).unwrap();

        let loaded = adapter.load_portfolio(5000.0).unwrap();
        assert_eq!(loaded.cash, 5005.0);
        assert!(loaded.holdings.is_empty());
    }

    #[test]
    fn no_tmp_file_left_behind() {
        let (dir, adapter) = adapter();
        adapter.save_portfolio(&PortfolioState::new(5000.0)).unwrap();
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn half_present_state_is_corrupt() {
        let (dir, adapter) = adapter();
        fs::write(dir.path().join("portfolio.csv"), PORTFOLIO_HEADER).unwrap();
        assert!(matches!(
            adapter.load_portfolio(5000.0),
            Err(PapertraderError::StateCorrupt { .. })
        ));
    }

    #[test]
    fn malformed_quantity_is_corrupt() {
        let (dir, adapter) = adapter();
        fs::write(
            dir.path().join("portfolio.csv"),
            format!("{}\nAAPL,not_a_number,100.0,,\n", PORTFOLIO_HEADER),
        )
        .unwrap();
        fs::write(dir.path().join("cash.csv"), "cash\n5000\n").unwrap();
        assert!(matches!(
            adapter.load_portfolio(5000.0),
            Err(PapertraderError::StateCorrupt { .. })
        ));
    }

    #[test]
    fn zero_quantity_holding_is_corrupt() {
        let (dir, adapter) = adapter();
        fs::write(
            dir.path().join("portfolio.csv"),
            format!("{}\nAAPL,0,100.0,,\n", PORTFOLIO_HEADER),
        )
        .unwrap();
        fs::write(dir.path().join("cash.csv"), "cash\n5000\n").unwrap();
        assert!(adapter.load_portfolio(5000.0).is_err());
    }

    #[test]
    fn negative_cash_is_corrupt() {
        let (dir, adapter) = adapter();
        fs::write(
            dir.path().join("portfolio.csv"),
            format!("{}\n", PORTFOLIO_HEADER),
        )
        .unwrap();
        fs::write(dir.path().join("cash.csv"), "cash\n-1.0\n").unwrap();
        assert!(matches!(
            adapter.load_portfolio(5000.0),
            Err(PapertraderError::StateCorrupt { .. })
        ));
    }

    #[test]
    fn trades_append_preserves_order() {
        let (_dir, adapter) = adapter();
        adapter
            .append_trades(&[sample_trade("AAPL", Side::Buy)])
            .unwrap();
        adapter
            .append_trades(&[
                sample_trade("MSFT", Side::Buy),
                sample_trade("AAPL", Side::Sell),
            ])
            .unwrap();

        let trades = adapter.load_trades().unwrap();
        assert_eq!(trades.len(), 3);
        assert_eq!(trades[0].symbol, "AAPL");
        assert_eq!(trades[0].side, Side::Buy);
        assert_eq!(trades[1].symbol, "MSFT");
        assert_eq!(trades[2].side, Side::Sell);
    }

    #[test]
    fn empty_trade_log_on_first_run() {
        let (_dir, adapter) = adapter();
        assert!(adapter.load_trades().unwrap().is_empty());
    }

    #[test]
    fn snapshots_append_and_load() {
        let (_dir, adapter) = adapter();
        adapter.append_snapshot(&sample_snapshot(31, 5000.0)).unwrap();
        adapter.append_snapshot(&sample_snapshot(32, 5032.17)).unwrap();

        let snapshots = adapter.load_snapshots().unwrap();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].week, 31);
        assert_eq!(snapshots[1].week, 32);
        assert_eq!(snapshots[1].equity, 5032.17);
    }

    #[test]
    fn summary_is_rewritten_whole() {
        let (dir, adapter) = adapter();
        let rows = vec![
            SummaryRow {
                year: 2026,
                week: 31,
                start_date: date(2026, 7, 27),
                end_date: date(2026, 7, 31),
                equity: 5000.0,
                weekly_pl: 0.0,
                outcome: PeriodOutcome::Flat,
            },
            SummaryRow {
                year: 2026,
                week: 32,
                start_date: date(2026, 8, 3),
                end_date: date(2026, 8, 7),
                equity: 5032.17,
                weekly_pl: 32.17,
                outcome: PeriodOutcome::Win,
            },
        ];
        adapter.write_summary(&rows).unwrap();
        adapter.write_summary(&rows).unwrap();

        let content = fs::read_to_string(dir.path().join("summary.csv")).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], SUMMARY_HEADER);
        assert!(lines[2].starts_with("2026,32,"));
        assert!(lines[2].ends_with("WIN"));
    }
}
