//! Configuration validation.
//!
//! Validates all config fields before a cycle runs.

use crate::domain::error::PapertraderError;
use crate::ports::config_port::ConfigPort;

pub fn validate_portfolio_config(config: &dyn ConfigPort) -> Result<(), PapertraderError> {
    let capital = config.get_double("portfolio", "starting_capital", 5000.0);
    if capital <= 0.0 {
        return Err(PapertraderError::ConfigInvalid {
            section: "portfolio".to_string(),
            key: "starting_capital".to_string(),
            reason: "starting_capital must be positive".to_string(),
        });
    }
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), PapertraderError> {
    validate_trade_amounts(config)?;
    validate_thresholds(config)?;
    validate_lookback(config)?;
    Ok(())
}

fn validate_trade_amounts(config: &dyn ConfigPort) -> Result<(), PapertraderError> {
    let buy = config.get_double("strategy", "buy_amount", 5.0);
    if buy <= 0.0 {
        return Err(PapertraderError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "buy_amount".to_string(),
            reason: "buy_amount must be positive".to_string(),
        });
    }
    let sell = config.get_double("strategy", "sell_amount", 10.0);
    if sell <= 0.0 {
        return Err(PapertraderError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "sell_amount".to_string(),
            reason: "sell_amount must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_thresholds(config: &dyn ConfigPort) -> Result<(), PapertraderError> {
    let drop_pct = config.get_double("strategy", "drop_pct", -5.0);
    if drop_pct >= 0.0 {
        return Err(PapertraderError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "drop_pct".to_string(),
            reason: "drop_pct must be negative".to_string(),
        });
    }
    let gain_pct = config.get_double("strategy", "gain_pct", 10.0);
    if gain_pct <= 0.0 {
        return Err(PapertraderError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "gain_pct".to_string(),
            reason: "gain_pct must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_lookback(config: &dyn ConfigPort) -> Result<(), PapertraderError> {
    let lookback = config.get_int("strategy", "lookback_days", 7);
    if lookback < 2 {
        return Err(PapertraderError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "lookback_days".to_string(),
            reason: "lookback_days must be at least 2".to_string(),
        });
    }
    Ok(())
}
