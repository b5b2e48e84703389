/// Position-sizing and risk-limit configuration, fixed for the life of
/// a `PortfolioManager`.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioConfig {
    pub max_single_position_pct: f64,
    pub max_total_positions: usize,
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
    pub max_drawdown_limit: f64,
    /// 0 disables the min-holding-days check entirely.
    pub min_holding_trading_days: u32,
    pub cash_buffer_pct: f64,
    pub min_position_value: f64,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            max_single_position_pct: 0.10,
            max_total_positions: 20,
            stop_loss_pct: 0.06,
            take_profit_pct: 0.12,
            max_drawdown_limit: 0.20,
            min_holding_trading_days: 0,
            cash_buffer_pct: 0.05,
            min_position_value: 10_000.0,
        }
    }
}
