use std::collections::BTreeMap;

use ashq_schemas::PortfolioSnapshot;

use crate::report::{ChartData, EquityPoint, SeriesPoint};

const HISTOGRAM_BUCKET_WIDTH: f64 = 0.01;
const HISTOGRAM_HALF_WIDTH_BUCKETS: i64 = 10;

/// Builds the four derived chart series; the benchmark series is
/// attached separately by the caller via `ChartData { benchmark, .. }`
/// since alignment needs data the analyzer doesn't otherwise carry.
pub fn build_chart_data(snapshots: &[PortfolioSnapshot]) -> ChartData {
    let equity_curve = snapshots
        .iter()
        .map(|s| EquityPoint {
            date: s.date,
            portfolio_value: s.total_value,
            cumulative_return: s.cumulative_return,
            daily_return: s.daily_return,
        })
        .collect();

    let drawdown = snapshots
        .iter()
        .map(|s| SeriesPoint {
            date: s.date,
            value: s.drawdown,
        })
        .collect();

    let return_histogram = build_histogram(snapshots);
    let monthly_returns = build_monthly_grid(snapshots);

    ChartData {
        equity_curve,
        drawdown,
        return_histogram,
        monthly_returns,
        benchmark: None,
    }
}

/// Fixed-width buckets of daily returns, centered on 0, spanning
/// ±`HISTOGRAM_HALF_WIDTH_BUCKETS` buckets; returns outside that range
/// collapse into the outermost bucket.
fn build_histogram(snapshots: &[PortfolioSnapshot]) -> Vec<(f64, u64)> {
    let mut buckets: BTreeMap<i64, u64> = BTreeMap::new();
    for s in snapshots {
        let raw_index = (s.daily_return / HISTOGRAM_BUCKET_WIDTH).floor() as i64;
        let clamped = raw_index.clamp(-HISTOGRAM_HALF_WIDTH_BUCKETS, HISTOGRAM_HALF_WIDTH_BUCKETS);
        *buckets.entry(clamped).or_insert(0) += 1;
    }

    buckets
        .into_iter()
        .map(|(idx, count)| (idx as f64 * HISTOGRAM_BUCKET_WIDTH, count))
        .collect()
}

/// Compounds daily returns within each calendar month into one
/// monthly return, keyed `"YYYY-MM"`.
fn build_monthly_grid(snapshots: &[PortfolioSnapshot]) -> BTreeMap<String, f64> {
    let mut grid: BTreeMap<String, f64> = BTreeMap::new();
    for s in snapshots {
        let key = s.date.format("%Y-%m").to_string();
        let entry = grid.entry(key).or_insert(1.0);
        *entry *= 1.0 + s.daily_return;
    }
    grid.values_mut().for_each(|v| *v -= 1.0);
    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn snap(date: &str, daily_return: f64) -> PortfolioSnapshot {
        PortfolioSnapshot {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            total_value: 0.0,
            cash: 0.0,
            positions_value: 0.0,
            position_count: 0,
            daily_return,
            cumulative_return: 0.0,
            drawdown: 0.0,
            positions: Default::default(),
        }
    }

    #[test]
    fn equity_curve_mirrors_snapshot_fields() {
        let snaps = vec![snap("2024-01-02", 0.0), snap("2024-01-03", 0.01)];
        let chart = build_chart_data(&snaps);
        assert_eq!(chart.equity_curve.len(), 2);
        assert_eq!(chart.equity_curve[1].daily_return, 0.01);
    }

    #[test]
    fn histogram_buckets_by_one_percent_width() {
        let snaps = vec![snap("2024-01-02", 0.015), snap("2024-01-03", 0.017)];
        let chart = build_chart_data(&snaps);
        // Both fall in the [0.01, 0.02) bucket.
        assert_eq!(chart.return_histogram.len(), 1);
        assert_eq!(chart.return_histogram[0].1, 2);
    }

    #[test]
    fn monthly_grid_compounds_within_month() {
        let snaps = vec![
            snap("2024-01-02", 0.01),
            snap("2024-01-03", 0.01),
            snap("2024-02-01", 0.02),
        ];
        let chart = build_chart_data(&snaps);
        let jan = chart.monthly_returns.get("2024-01").copied().unwrap();
        assert!((jan - (1.01 * 1.01 - 1.0)).abs() < 1e-12);
        let feb = chart.monthly_returns.get("2024-02").copied().unwrap();
        assert!((feb - 0.02).abs() < 1e-12);
    }
}
