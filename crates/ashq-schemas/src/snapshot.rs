use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::{Position, Symbol};

/// End-of-day portfolio state. Produced once per trading day by
/// `PortfolioManager::snapshot`; append-only once produced — never
/// mutated or removed afterward.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PortfolioSnapshot {
    pub date: NaiveDate,
    pub total_value: f64,
    pub cash: f64,
    pub positions_value: f64,
    pub position_count: usize,
    pub daily_return: f64,
    pub cumulative_return: f64,
    /// Non-positive fraction: deviation of `total_value` from the
    /// running peak seen so far.
    pub drawdown: f64,
    /// Structural copy of positions at the time of the snapshot; never
    /// a live reference into the portfolio's working map.
    pub positions: BTreeMap<Symbol, Position>,
}
