use std::collections::BTreeMap;

use ashq_schemas::Symbol;

/// Basic + advanced risk/return statistics over a snapshot sequence.
/// Degenerate inputs (empty snapshots) produce an all-zero report
/// rather than an error.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BasicMetrics {
    pub total_return: f64,
    pub trading_years: f64,
    pub annual_return: f64,
    pub volatility: f64,
    pub sharpe: f64,
    pub max_drawdown: f64,
    pub calmar: f64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RelativeMetrics {
    pub beta: f64,
    pub alpha: f64,
    pub info_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AdvancedMetrics {
    pub sortino: f64,
    pub var_5: f64,
    pub cvar_5: f64,
    pub max_consecutive_losing_days: u32,
    pub winning_days_ratio: f64,
    pub avg_win_loss_ratio: f64,
    pub relative: Option<RelativeMetrics>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TradeMetrics {
    pub total_trades: u64,
    pub buy_trades: u64,
    pub sell_trades: u64,
    pub total_commission: f64,
    pub total_stamp_tax: f64,
    pub monthly_trade_frequency: f64,
    pub avg_holding_period_days: f64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PerformanceReport {
    pub basic: BasicMetrics,
    pub advanced: AdvancedMetrics,
    pub trade: TradeMetrics,
}

impl PerformanceReport {
    pub fn empty() -> Self {
        Self {
            basic: BasicMetrics {
                total_return: 0.0,
                trading_years: 0.0,
                annual_return: 0.0,
                volatility: 0.0,
                sharpe: 0.0,
                max_drawdown: 0.0,
                calmar: 0.0,
            },
            advanced: AdvancedMetrics {
                sortino: 0.0,
                var_5: 0.0,
                cvar_5: 0.0,
                max_consecutive_losing_days: 0,
                winning_days_ratio: 0.0,
                avg_win_loss_ratio: 0.0,
                relative: None,
            },
            trade: TradeMetrics {
                total_trades: 0,
                buy_trades: 0,
                sell_trades: 0,
                total_commission: 0.0,
                total_stamp_tax: 0.0,
                monthly_trade_frequency: 0.0,
                avg_holding_period_days: 0.0,
            },
        }
    }
}

/// One point of a date-indexed series, used by every chart-data series.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SeriesPoint {
    pub date: chrono::NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChartData {
    /// (date, portfolio_value, cumulative_return, daily_return).
    pub equity_curve: Vec<EquityPoint>,
    pub drawdown: Vec<SeriesPoint>,
    /// Histogram buckets of daily returns: (bucket_lower_bound, count).
    pub return_histogram: Vec<(f64, u64)>,
    /// Month-grid of compounded monthly returns, keyed "YYYY-MM".
    pub monthly_returns: BTreeMap<String, f64>,
    /// Benchmark series aligned to portfolio dates; `None` if no
    /// benchmark was configured at all.
    pub benchmark: Option<BenchmarkSeries>,
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EquityPoint {
    pub date: chrono::NaiveDate,
    pub portfolio_value: f64,
    pub cumulative_return: f64,
    pub daily_return: f64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BenchmarkSeries {
    pub symbol: Symbol,
    pub points: Vec<SeriesPoint>,
    /// `true` when no real benchmark source was wired in and this
    /// series was synthesized — callers must never present it as real
    /// market data.
    pub is_simulated: bool,
}
