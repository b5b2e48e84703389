use std::path::PathBuf;

use ashq_portfolio::PortfolioConfig;
use ashq_sim::TradingRule;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Everything the engine needs to run one backtest: capital, date
/// range, the A-share fee/limit table, position-sizing/risk knobs, and
/// run-output preferences. Deserialized straight off the canonical
/// JSON produced by `load_layered_yaml`, so every field falls back to
/// `Default` when a layer omits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    pub initial_cash: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    // A-share fee/limit table; mirrors `ashq_sim::TradingRule`
    // field-for-field so the two can be converted losslessly.
    pub commission_rate: f64,
    pub min_commission: f64,
    pub stamp_tax_rate: f64,
    pub transfer_fee_rate: f64,
    pub transfer_fee_floor: f64,
    pub slippage_rate: f64,
    pub buy_unit: i64,
    pub limit_pct: f64,
    pub st_limit_pct: f64,
    pub limit_epsilon: f64,

    // Position-sizing / risk knobs; mirrors `ashq_portfolio::PortfolioConfig`.
    pub max_single_position_pct: f64,
    pub max_total_positions: usize,
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
    pub max_drawdown_limit: f64,
    pub min_holding_trading_days: u32,
    pub cash_buffer_pct: f64,
    pub min_position_value: f64,

    pub data_frequency: String,
    pub benchmark: String,
    pub output_dir: PathBuf,
    pub save_trades: bool,
    pub save_positions: bool,
    pub save_performance: bool,

    /// Seed for any deterministic synthetic randomness.
    pub seed: u64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        let rule = TradingRule::default();
        let portfolio = PortfolioConfig::default();
        Self {
            initial_cash: 1_000_000.0,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date"),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31).expect("valid date"),

            commission_rate: rule.commission_rate,
            min_commission: rule.min_commission,
            stamp_tax_rate: rule.stamp_tax_rate,
            transfer_fee_rate: rule.transfer_fee_rate,
            transfer_fee_floor: rule.transfer_fee_floor,
            slippage_rate: rule.slippage_rate,
            buy_unit: rule.buy_unit,
            limit_pct: rule.limit_pct,
            st_limit_pct: rule.st_limit_pct,
            limit_epsilon: rule.limit_epsilon,

            max_single_position_pct: portfolio.max_single_position_pct,
            max_total_positions: portfolio.max_total_positions,
            stop_loss_pct: portfolio.stop_loss_pct,
            take_profit_pct: portfolio.take_profit_pct,
            max_drawdown_limit: portfolio.max_drawdown_limit,
            min_holding_trading_days: portfolio.min_holding_trading_days,
            cash_buffer_pct: portfolio.cash_buffer_pct,
            min_position_value: portfolio.min_position_value,

            data_frequency: "daily".to_string(),
            benchmark: "000300.SH".to_string(),
            output_dir: PathBuf::from("output"),
            save_trades: true,
            save_positions: true,
            save_performance: true,

            seed: 42,
        }
    }
}

impl BacktestConfig {
    /// Reject configs that are structurally invalid: inverted date
    /// range, non-positive capital, a concentration cap outside
    /// `(0, 1]`, and negative fee/risk knobs that would otherwise
    /// silently flip a sign somewhere downstream.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_date >= self.end_date {
            return Err(ConfigError::InvalidDateRange {
                start: self.start_date.to_string(),
                end: self.end_date.to_string(),
            });
        }
        if self.initial_cash <= 0.0 {
            return Err(nonpositive("initial_cash", self.initial_cash));
        }
        if !(self.max_single_position_pct > 0.0 && self.max_single_position_pct <= 1.0) {
            return Err(ConfigError::OutOfUnitRange {
                field: "max_single_position_pct",
                value: self.max_single_position_pct.to_string(),
            });
        }
        if self.max_total_positions == 0 {
            return Err(nonpositive("max_total_positions", self.max_total_positions as f64));
        }
        if self.stop_loss_pct <= 0.0 {
            return Err(nonpositive("stop_loss_pct", self.stop_loss_pct));
        }
        if self.take_profit_pct < 0.0 {
            return Err(negative("take_profit_pct", self.take_profit_pct));
        }
        if self.max_drawdown_limit <= 0.0 {
            return Err(nonpositive("max_drawdown_limit", self.max_drawdown_limit));
        }
        if !(0.0..1.0).contains(&self.cash_buffer_pct) {
            return Err(ConfigError::OutOfUnitRange {
                field: "cash_buffer_pct",
                value: self.cash_buffer_pct.to_string(),
            });
        }
        if self.min_position_value < 0.0 {
            return Err(negative("min_position_value", self.min_position_value));
        }
        if self.buy_unit <= 0 {
            return Err(nonpositive("buy_unit", self.buy_unit as f64));
        }
        for (field, value) in [
            ("commission_rate", self.commission_rate),
            ("min_commission", self.min_commission),
            ("stamp_tax_rate", self.stamp_tax_rate),
            ("transfer_fee_rate", self.transfer_fee_rate),
            ("transfer_fee_floor", self.transfer_fee_floor),
            ("slippage_rate", self.slippage_rate),
        ] {
            if value < 0.0 {
                return Err(negative(field, value));
            }
        }
        if !(self.limit_pct > 0.0 && self.limit_pct < 1.0) {
            return Err(ConfigError::OutOfUnitRange {
                field: "limit_pct",
                value: self.limit_pct.to_string(),
            });
        }
        if !(self.st_limit_pct > 0.0 && self.st_limit_pct < 1.0) {
            return Err(ConfigError::OutOfUnitRange {
                field: "st_limit_pct",
                value: self.st_limit_pct.to_string(),
            });
        }

        Ok(())
    }

    pub fn to_trading_rule(&self) -> TradingRule {
        TradingRule {
            limit_pct: self.limit_pct,
            st_limit_pct: self.st_limit_pct,
            buy_unit: self.buy_unit,
            commission_rate: self.commission_rate,
            min_commission: self.min_commission,
            stamp_tax_rate: self.stamp_tax_rate,
            transfer_fee_rate: self.transfer_fee_rate,
            transfer_fee_floor: self.transfer_fee_floor,
            slippage_rate: self.slippage_rate,
            limit_epsilon: self.limit_epsilon,
        }
    }

    pub fn to_portfolio_config(&self) -> PortfolioConfig {
        PortfolioConfig {
            max_single_position_pct: self.max_single_position_pct,
            max_total_positions: self.max_total_positions,
            stop_loss_pct: self.stop_loss_pct,
            take_profit_pct: self.take_profit_pct,
            max_drawdown_limit: self.max_drawdown_limit,
            min_holding_trading_days: self.min_holding_trading_days,
            cash_buffer_pct: self.cash_buffer_pct,
            min_position_value: self.min_position_value,
        }
    }
}

fn nonpositive(field: &'static str, value: f64) -> ConfigError {
    ConfigError::NonPositive { field, value: value.to_string() }
}

fn negative(field: &'static str, value: f64) -> ConfigError {
    ConfigError::Negative { field, value: value.to_string() }
}
