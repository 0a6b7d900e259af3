//! CLI definition and dispatch.

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_market_data_adapter::CsvMarketDataAdapter;
use crate::adapters::csv_state_adapter::CsvStateAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::file_universe_adapter::FileUniverseAdapter;
use crate::domain::config_validation::{validate_portfolio_config, validate_strategy_config};
use crate::domain::engine::{run_daily_cycle, EngineRules};
use crate::domain::error::PapertraderError;
use crate::domain::performance::{build_summary, run_weekly_evaluation};
use crate::ports::config_port::ConfigPort;
use crate::ports::state_port::StatePort;
use crate::ports::universe_port::UniversePort;

#[derive(Parser, Debug)]
#[command(name = "papertrader", about = "Equities paper-trading simulator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one daily trading cycle
    Trade {
        #[arg(short, long, default_value = "papertrader.ini")]
        config: PathBuf,
        /// Evaluation date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Run the weekly performance evaluation
    Evaluate {
        #[arg(short, long, default_value = "papertrader.ini")]
        config: PathBuf,
        /// Evaluation date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Trade { config, date } => run_trade(&config, date),
        Command::Evaluate { config, date } => run_evaluate(&config, date),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = PapertraderError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

pub fn build_engine_rules(config: &dyn ConfigPort) -> EngineRules {
    let defaults = EngineRules::default();
    EngineRules {
        buy_amount: config.get_double("strategy", "buy_amount", defaults.buy_amount),
        sell_amount: config.get_double("strategy", "sell_amount", defaults.sell_amount),
        drop_pct: config.get_double("strategy", "drop_pct", defaults.drop_pct),
        gain_pct: config.get_double("strategy", "gain_pct", defaults.gain_pct),
        lookback_days: config.get_int("strategy", "lookback_days", defaults.lookback_days),
    }
}

pub fn starting_capital(config: &dyn ConfigPort) -> f64 {
    config.get_double("portfolio", "starting_capital", 5000.0)
}

pub fn price_dir(config: &dyn ConfigPort) -> PathBuf {
    PathBuf::from(
        config
            .get_string("data", "price_dir")
            .unwrap_or_else(|| "prices".to_string()),
    )
}

pub fn universe_file(config: &dyn ConfigPort) -> PathBuf {
    PathBuf::from(
        config
            .get_string("data", "universe_file")
            .unwrap_or_else(|| "universe.txt".to_string()),
    )
}

pub fn state_dir(config: &dyn ConfigPort) -> PathBuf {
    PathBuf::from(
        config
            .get_string("state", "dir")
            .unwrap_or_else(|| "state".to_string()),
    )
}

fn resolve_date(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Local::now().date_naive())
}

fn run_trade(config_path: &PathBuf, date: Option<NaiveDate>) -> ExitCode {
    // Stage 1: Load config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    // Stage 2: Validate config
    if let Err(e) = validate_portfolio_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = validate_strategy_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let rules = build_engine_rules(&adapter);
    let today = resolve_date(date);

    // Stage 3: Fetch the universe (re-read each cycle; total failure is fatal)
    let universe_port = FileUniverseAdapter::new(universe_file(&adapter));
    let universe = match universe_port.fetch_universe() {
        Ok(u) => u,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if universe.is_empty() {
        let err = PapertraderError::UniverseEmpty {
            reason: format!("no symbols in {}", universe_file(&adapter).display()),
        };
        eprintln!("error: {err}");
        return (&err).into();
    }

    // Stage 4: Load portfolio state
    let state_port = CsvStateAdapter::new(state_dir(&adapter));
    let portfolio = match state_port.load_portfolio(starting_capital(&adapter)) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 5: Run the cycle
    eprintln!("Evaluating {} symbols for {}", universe.len(), today);
    let market = CsvMarketDataAdapter::new(price_dir(&adapter));
    let result = run_daily_cycle(&universe, &market, portfolio, &rules, today);

    // Stage 6: Persist updated state and the day's trades
    if let Err(e) = state_port.save_portfolio(&result.portfolio) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = state_port.append_trades(&result.trades) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    // Stage 7: Daily summary
    eprintln!("\n=== {} ===", today);
    if result.trades.is_empty() {
        eprintln!("No trades executed.");
    } else {
        for trade in &result.trades {
            eprintln!(
                "  {:<4} {} {:.4} @ ${:.2}",
                trade.side.to_string(),
                trade.symbol,
                trade.quantity,
                trade.price
            );
        }
    }
    if !result.skipped.is_empty() {
        eprintln!(
            "Skipped {} of {} symbols.",
            result.skipped.len(),
            universe.len()
        );
    }
    eprintln!("Cash balance: ${:.2}", result.portfolio.cash);

    ExitCode::SUCCESS
}

fn run_evaluate(config_path: &PathBuf, date: Option<NaiveDate>) -> ExitCode {
    // Stage 1: Load config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    // Stage 2: Validate config
    if let Err(e) = validate_portfolio_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let capital = starting_capital(&adapter);
    let eval_date = resolve_date(date);

    // Stage 3: Load portfolio state and performance history
    let state_port = CsvStateAdapter::new(state_dir(&adapter));
    let portfolio = match state_port.load_portfolio(capital) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let mut snapshots = match state_port.load_snapshots() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let trades = match state_port.load_trades() {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 4: Mark to market
    eprintln!(
        "Evaluating {} holdings for the week of {}",
        portfolio.holding_count(),
        eval_date
    );
    let market = CsvMarketDataAdapter::new(price_dir(&adapter));
    let result = run_weekly_evaluation(&portfolio, &market, snapshots.last(), capital, eval_date);

    // Stage 5: Append the snapshot and rebuild the summary
    if let Err(e) = state_port.append_snapshot(&result.snapshot) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    snapshots.push(result.snapshot.clone());
    if let Err(e) = state_port.write_summary(&build_summary(&snapshots)) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    // Stage 6: Performance report
    let snapshot = &result.snapshot;
    let pl_sign = if snapshot.weekly_pl >= 0.0 { "+" } else { "-" };
    eprintln!(
        "\n=== Weekly Performance: {} week {} ===",
        snapshot.year, snapshot.week
    );
    eprintln!(
        "Period:            {} to {}",
        snapshot.start_date, snapshot.end_date
    );
    eprintln!("Cash:              ${:.2}", snapshot.cash);
    eprintln!("Invested:          ${:.2}", snapshot.invested);
    eprintln!("Total equity:      ${:.2}", snapshot.equity);
    eprintln!(
        "Weekly P/L:        {}${:.2} ({})",
        pl_sign,
        snapshot.weekly_pl.abs(),
        snapshot.outcome
    );
    eprintln!("Trades to date:    {}", trades.len());

    if !result.valuations.is_empty() {
        let mut total_unrealized = 0.0;
        eprintln!("\n=== Holdings ===");
        for v in &result.valuations {
            total_unrealized += v.unrealized_pl;
            let sign = if v.unrealized_pl >= 0.0 { "+" } else { "-" };
            eprintln!(
                "  {}: {:.4} units | Book: ${:.2} | Market: ${:.2} | P/L: {}${:.2}",
                v.symbol,
                v.quantity,
                v.book_cost,
                v.market_value,
                sign,
                v.unrealized_pl.abs()
            );
        }
        let winners = result
            .valuations
            .iter()
            .filter(|v| v.unrealized_pl > 0.0)
            .count();
        let losers = result
            .valuations
            .iter()
            .filter(|v| v.unrealized_pl < 0.0)
            .count();
        eprintln!("\nWinning positions: {} | Losing positions: {}", winners, losers);
        eprintln!("Total unrealized P/L: ${:.2}", total_unrealized);
    }
    if !result.skipped.is_empty() {
        eprintln!(
            "{} holdings could not be priced and were omitted.",
            result.skipped.len()
        );
    }

    ExitCode::SUCCESS
}
