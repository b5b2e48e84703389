use ashq_config::BacktestConfig;
use ashq_orders::TradingSummary;
use ashq_perf::{ChartData, PerformanceReport};
use ashq_portfolio::PortfolioSummary;
use ashq_strategy::StrategyInfo;

/// Everything a completed run produces, bundled for persistence and for
/// handing back to a caller that wants to inspect it in-process.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BacktestRunResult {
    pub config: BacktestConfig,
    pub strategy_info: StrategyInfo,
    pub performance: PerformanceReport,
    pub portfolio_summary: PortfolioSummary,
    pub trading_summary: TradingSummary,
    pub chart_data: ChartData,
}
