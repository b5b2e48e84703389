use ashq_schemas::{PortfolioSnapshot, Trade};

use crate::basic::compute_basic_metrics;
use crate::advanced::compute_advanced_metrics;
use crate::report::{BenchmarkSeries, ChartData, PerformanceReport};
use crate::trade_metrics::compute_trade_metrics;

/// Derives a `PerformanceReport` and its accompanying `ChartData` from
/// an immutable snapshot sequence and trade log; consumes values only,
/// never mutates them, matching the engine's append-only/read-only
/// contract for these two collections.
pub struct PerformanceAnalyzer;

impl PerformanceAnalyzer {
    /// `benchmark_daily_returns`, if present, must be aligned 1:1 with
    /// `snapshots` (same length, same date order) to be used for
    /// Beta/Alpha/Information-ratio; a mismatched length is silently
    /// dropped rather than treated as an error.
    pub fn analyze(
        snapshots: &[PortfolioSnapshot],
        trades: &[Trade],
        benchmark_daily_returns: Option<&[f64]>,
    ) -> PerformanceReport {
        if snapshots.is_empty() {
            return PerformanceReport::empty();
        }

        let basic = compute_basic_metrics(snapshots);
        let advanced = compute_advanced_metrics(snapshots, basic.annual_return, benchmark_daily_returns);
        let trade = compute_trade_metrics(trades);

        PerformanceReport {
            basic,
            advanced,
            trade,
        }
    }

    pub fn chart_data(snapshots: &[PortfolioSnapshot], benchmark: Option<BenchmarkSeries>) -> ChartData {
        let mut chart = crate::charts::build_chart_data(snapshots);
        chart.benchmark = benchmark;
        chart
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn snap(date: &str, cumulative_return: f64, daily_return: f64, drawdown: f64) -> PortfolioSnapshot {
        PortfolioSnapshot {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            total_value: 1_000_000.0 * (1.0 + cumulative_return),
            cash: 0.0,
            positions_value: 0.0,
            position_count: 0,
            daily_return,
            cumulative_return,
            drawdown,
            positions: BTreeMap::new(),
        }
    }

    #[test]
    fn zero_trades_gives_report_with_zeros_not_an_error() {
        let report = PerformanceAnalyzer::analyze(&[], &[], None);
        assert_eq!(report.basic.total_return, 0.0);
        assert_eq!(report.trade.total_trades, 0);
    }

    #[test]
    fn populated_run_produces_consistent_report() {
        let snaps = vec![
            snap("2024-01-02", 0.0, 0.0, 0.0),
            snap("2024-01-03", 0.01, 0.01, 0.0),
            snap("2024-01-04", 0.03, 0.0198, 0.0),
        ];
        let report = PerformanceAnalyzer::analyze(&snaps, &[], None);
        assert_eq!(report.basic.total_return, 0.03);
        assert!(report.basic.max_drawdown <= 0.0);
    }
}
