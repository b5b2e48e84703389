use std::collections::BTreeMap;

use ashq_schemas::{Position, Symbol};

/// Read-only view handed to strategies via
/// `generate_signals(date, market_day, portfolio_summary)` and embedded
/// in the persisted run result.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PortfolioSummary {
    pub cash: f64,
    pub positions_value: f64,
    pub total_value: f64,
    pub position_count: usize,
    pub total_trades: u64,
    pub winning_trades: u64,
    pub losing_trades: u64,
    pub max_drawdown: f64,
    pub positions: BTreeMap<Symbol, Position>,
}
