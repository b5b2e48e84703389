//! ashq-config
//!
//! Layered YAML configuration for the backtesting engine: a typed
//! `BacktestConfig` plus a deep-merge-then-canonicalize-then-hash loader
//! in the same style used for every other config surface in this
//! workspace, so a given set of config files always produces the same
//! `config_hash` regardless of YAML key order.

mod backtest_config;
mod error;
mod layered;

pub use backtest_config::BacktestConfig;
pub use error::ConfigError;
pub use layered::{apply_env_overrides, load_layered_yaml, LoadedConfig};
