//! Concrete adapter implementations for ports.

pub mod csv_market_data_adapter;
pub mod csv_state_adapter;
pub mod file_config_adapter;
pub mod file_universe_adapter;
