use chrono::NaiveDate;
use serde_json::Value;
use std::collections::BTreeMap;

/// Passed once to `Strategy::initialize`.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyContext {
    pub initial_cash: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Arbitrary strategy-specific knobs, sourced from the layered
    /// backtest config (free-form: the engine has no opinion on what a
    /// strategy needs).
    pub config: BTreeMap<String, Value>,
}

impl StrategyContext {
    pub fn new(initial_cash: f64, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            initial_cash,
            start_date,
            end_date,
            config: BTreeMap::new(),
        }
    }

    pub fn with_config(mut self, config: BTreeMap<String, Value>) -> Self {
        self.config = config;
        self
    }
}

/// Metadata a strategy reports about itself, consumed by run-result
/// persistence.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct StrategyInfo {
    pub name: String,
    pub version: String,
    pub knobs: BTreeMap<String, Value>,
    pub counters: BTreeMap<String, i64>,
}
